//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Environment variable overrides
//! - Configuration validation
//! - Typed YAML files for plugin settings

pub mod loader;
pub mod yaml_store;

pub use loader::{ConfigError, ConfigLoader};
pub use yaml_store::YamlConfigStore;
