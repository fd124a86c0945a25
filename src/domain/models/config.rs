use serde::{Deserialize, Serialize};

use crate::infrastructure::logging::config::LogConfig;

/// Main configuration structure for forgekit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LogConfig,

    /// Command discovery and invocation settings
    #[serde(default)]
    pub commands: CommandsConfig,
}

/// Command discovery and invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CommandsConfig {
    /// Module path scanned for command classes; empty scans everything
    #[serde(default)]
    pub base_package: String,

    /// Message sent to the invoker when a handler fails
    #[serde(default = "default_failure_message")]
    pub failure_message: String,

    /// World-thread handlers running longer than this are logged as warnings
    #[serde(default = "default_slow_handler_warn_ms")]
    pub slow_handler_warn_ms: u64,
}

fn default_failure_message() -> String {
    "An error occurred while executing this command.".to_string()
}

const fn default_slow_handler_warn_ms() -> u64 {
    50
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            base_package: String::new(),
            failure_message: default_failure_message(),
            slow_handler_warn_ms: default_slow_handler_warn_ms(),
        }
    }
}
