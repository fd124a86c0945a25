//! `forgekit commands`: list what the sample plugin registered.

use anyhow::Result;
use serde::Serialize;

use crate::adapters::memory_host::CommandInfo;
use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::cli::sample;
use crate::domain::models::config::Config;

#[derive(Debug, Serialize)]
pub struct CommandListOutput {
    pub commands: Vec<CommandInfo>,
    pub total: usize,
}

impl CommandOutput for CommandListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["name", "kind", "usage", "permission", "aliases"]);
        for command in &self.commands {
            table.add_row(vec![
                command.name.clone(),
                command.kind.to_string(),
                command.usage.clone(),
                command.permission.clone().unwrap_or_else(|| "-".to_string()),
                if command.aliases.is_empty() {
                    "-".to_string()
                } else {
                    command.aliases.join(", ")
                },
            ]);
        }
        render_list("command", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let (host, _) = sample::boot(config)?;
    let commands = host.commands();
    let out = CommandListOutput {
        total: commands.len(),
        commands,
    };
    output(&out, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_listing_shows_usage_and_permission() {
        let (host, _) = sample::boot(&Config::default()).unwrap();
        let commands = host.commands();
        let out = CommandListOutput {
            total: commands.len(),
            commands,
        };
        let human = out.to_human();
        assert!(human.starts_with("5 commands:"));
        assert!(human.contains("forgekit.heal"));
        assert!(human.contains("inspect"));

        let json = out.to_json();
        assert_eq!(json["total"], 5);
        assert_eq!(json["commands"][0]["name"], "greet");
    }
}
