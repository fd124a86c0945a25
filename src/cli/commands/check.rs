//! `forgekit check`: scan and validate the sample catalog.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::cli::sample;
use crate::domain::models::command::{CommandDefinition, ParameterKind};
use crate::domain::models::config::Config;
use crate::services::command_scanner::CommandScanner;
use crate::services::resolver_registry::ResolverRegistry;

#[derive(Debug, Serialize)]
pub struct DefinitionOutput {
    pub name: String,
    pub category: String,
    pub class_name: String,
    pub arguments: Vec<String>,
    pub context: Vec<String>,
}

impl From<&CommandDefinition> for DefinitionOutput {
    fn from(definition: &CommandDefinition) -> Self {
        let mut arguments = Vec::new();
        let mut context = Vec::new();
        for param in definition.parameters() {
            match param.kind() {
                ParameterKind::Argument(arg) => arguments.push(match &arg.default_value {
                    Some(default) => format!("{}={default}", arg.name),
                    None if !arg.required => format!("{}?", arg.name),
                    None => arg.name.clone(),
                }),
                ParameterKind::Context => context.push(param.name().to_string()),
            }
        }
        Self {
            name: definition.name().to_string(),
            category: definition.category().to_string(),
            class_name: definition.class_name().to_string(),
            arguments,
            context,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub base_package: String,
    pub definitions: Vec<DefinitionOutput>,
    pub total: usize,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["name", "category", "arguments", "context"]);
        for definition in &self.definitions {
            table.add_row(vec![
                definition.name.clone(),
                definition.category.clone(),
                definition.arguments.join(" "),
                definition.context.join(", "),
            ]);
        }
        render_list("valid command", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn check(config: &Config) -> Result<CheckOutput> {
    let base_package = config.commands.base_package.clone();
    let scanner = CommandScanner::new(Arc::new(ResolverRegistry::with_builtins()));
    let mut definitions = scanner
        .scan(&sample::catalog(), &base_package)
        .context("Sample catalog failed validation")?;
    definitions.sort_by(|a, b| a.name().cmp(b.name()));

    Ok(CheckOutput {
        base_package,
        total: definitions.len(),
        definitions: definitions.iter().map(DefinitionOutput::from).collect(),
    })
}

pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    output(&check(config)?, json_mode);
    Ok(())
}
