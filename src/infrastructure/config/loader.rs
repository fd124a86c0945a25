use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::infrastructure::logging::logger::parse_log_level;

/// Project configuration file
pub const CONFIG_FILE: &str = "forgekit.yaml";
/// Local, uncommitted overrides
pub const LOCAL_CONFIG_FILE: &str = "forgekit.local.yaml";
/// Prefix of environment overrides; `__` separates nested keys
pub const ENV_PREFIX: &str = "FORGEKIT_";

/// Configuration error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Failure message cannot be empty")]
    EmptyFailureMessage,

    #[error("Invalid base package '{0}': expected a '::'-separated module path")]
    InvalidBasePackage(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. forgekit.yaml (project config)
    /// 3. forgekit.local.yaml (local overrides, optional)
    /// 4. Environment variables (FORGEKIT_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(CONFIG_FILE))
            .merge(Yaml::file(LOCAL_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring environment
    /// overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if parse_log_level(&config.logging.level).is_err() {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.commands.failure_message.trim().is_empty() {
            return Err(ConfigError::EmptyFailureMessage);
        }

        let package = &config.commands.base_package;
        if !package.is_empty()
            && package
                .split("::")
                .any(|segment| segment.is_empty() || segment.contains(char::is_whitespace))
        {
            return Err(ConfigError::InvalidBasePackage(package.clone()));
        }

        Ok(())
    }
}
