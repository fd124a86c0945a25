//! `forgekit run`: dispatch one command line on the sample host.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::adapters::memory_host::{MemoryHost, Sender};
use crate::cli::output::{output, CommandOutput};
use crate::cli::sample;
use crate::domain::models::config::Config;
use crate::domain::ports::EntityRef;

/// Options of a `run` invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub line: String,
    pub as_player: Option<String>,
    pub looking_at: Vec<u64>,
    pub grant: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub sender: String,
    pub line: String,
    pub messages: Vec<String>,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        if self.messages.is_empty() {
            return format!("'{}' completed without output.", self.line);
        }
        self.messages.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Prepare the sender on `host` and dispatch the line.
pub fn dispatch(host: &MemoryHost, options: &RunOptions) -> Result<RunOutput> {
    let sender = match &options.as_player {
        Some(name) => {
            for permission in &options.grant {
                host.grant(name, permission)?;
            }
            if !options.looking_at.is_empty() {
                let entities = options.looking_at.iter().copied().map(EntityRef).collect();
                host.set_looking_at(name, entities)?;
            }
            Sender::player(name.as_str())
        }
        None => {
            anyhow::ensure!(
                options.grant.is_empty() && options.looking_at.is_empty(),
                "--grant and --looking-at need a player; pass --as <player>"
            );
            Sender::Console
        }
    };

    let messages = host
        .dispatch(&sender, &options.line)
        .with_context(|| format!("Failed to run '{}'", options.line))?;
    Ok(RunOutput {
        sender: sender.name().to_string(),
        line: options.line.clone(),
        messages,
    })
}

pub fn execute(options: RunOptions, config: &Config, json_mode: bool) -> Result<()> {
    let (host, _) = sample::boot(config)?;
    let out = dispatch(&host, &options)?;
    output(&out, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_host::DispatchError;

    fn options(line: &str) -> RunOptions {
        RunOptions {
            line: line.to_string(),
            ..RunOptions::default()
        }
    }

    #[test]
    fn test_console_dispatch() {
        let (host, _) = sample::boot(&Config::default()).unwrap();
        let out = dispatch(&host, &options("ping")).unwrap();
        assert_eq!(out.sender, "CONSOLE");
        assert_eq!(out.to_human(), "Pong!");
    }

    #[test]
    fn test_grant_applies_before_dispatch() {
        let (host, _) = sample::boot(&Config::default()).unwrap();
        let mut opts = options("heal");
        opts.as_player = Some("alex".to_string());

        let err = dispatch(&host, &opts).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DispatchError>(),
            Some(DispatchError::PermissionDenied { .. })
        ));

        opts.grant = vec!["forgekit.heal".to_string()];
        let out = dispatch(&host, &opts).unwrap();
        assert_eq!(out.messages, vec!["Healed alex by 20 (70/100)"]);
    }

    #[test]
    fn test_console_cannot_look_at_entities() {
        let (host, _) = sample::boot(&Config::default()).unwrap();
        let mut opts = options("inspect");
        opts.looking_at = vec![1];
        assert!(dispatch(&host, &opts).is_err());
    }
}
