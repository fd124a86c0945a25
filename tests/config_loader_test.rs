//! Configuration loading through files and environment overrides.

mod common;

use std::fs;

use forgekit::infrastructure::config::YamlConfigStore;
use forgekit::infrastructure::logging::LogFormat;
use forgekit::ConfigLoader;
use serde::{Deserialize, Serialize};

const PLUGIN_YAML: &str = "\
logging:
  level: warn
  format: json
commands:
  base_package: my_plugin::commands
  failure_message: That did not work.
  slow_handler_warn_ms: 5
";

#[test]
fn test_load_from_file() {
    let dir = common::temp_dir();
    let path = dir.path().join("forgekit.yaml");
    fs::write(&path, PLUGIN_YAML).unwrap();

    temp_env::with_vars_unset(
        ["FORGEKIT_LOGGING__LEVEL", "FORGEKIT_COMMANDS__BASE_PACKAGE"],
        || {
            let config = ConfigLoader::load_from_file(&path).unwrap();
            assert_eq!(config.logging.level, "warn");
            assert_eq!(config.logging.format, LogFormat::Json);
            assert_eq!(config.commands.base_package, "my_plugin::commands");
            assert_eq!(config.commands.failure_message, "That did not work.");
            assert_eq!(config.commands.slow_handler_warn_ms, 5);
        },
    );
}

#[test]
fn test_environment_overrides_file() {
    let dir = common::temp_dir();
    let path = dir.path().join("forgekit.yaml");
    fs::write(&path, PLUGIN_YAML).unwrap();

    temp_env::with_vars(
        [
            ("FORGEKIT_LOGGING__LEVEL", Some("debug")),
            ("FORGEKIT_COMMANDS__BASE_PACKAGE", Some("other_plugin")),
        ],
        || {
            let config = ConfigLoader::load_from_file(&path).unwrap();
            assert_eq!(config.logging.level, "debug");
            assert_eq!(config.commands.base_package, "other_plugin");
            assert_eq!(config.commands.failure_message, "That did not work.");
        },
    );
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = common::temp_dir();

    temp_env::with_vars_unset(
        ["FORGEKIT_LOGGING__LEVEL", "FORGEKIT_COMMANDS__BASE_PACKAGE"],
        || {
            let config = ConfigLoader::load_from_file(dir.path().join("absent.yaml")).unwrap();
            assert_eq!(config.logging.level, "info");
            assert!(config.commands.base_package.is_empty());
        },
    );
}

#[test]
fn test_invalid_environment_value_rejected() {
    let dir = common::temp_dir();

    temp_env::with_var("FORGEKIT_LOGGING__LEVEL", Some("loud"), || {
        let err = ConfigLoader::load_from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("loud"));
    });
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ShopSettings {
    currency: String,
    prices: Vec<u32>,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            currency: "gold".to_string(),
            prices: vec![1, 5, 10],
        }
    }
}

#[test]
fn test_yaml_store_creates_then_reads_back() {
    let dir = common::temp_dir();
    let store = YamlConfigStore::new(dir.path().join("plugins/shop"));

    let created: ShopSettings = store.load_or_create("shop.yaml").unwrap();
    assert_eq!(created, ShopSettings::default());
    assert!(store.path("shop.yaml").exists());

    fs::write(store.path("shop.yaml"), "currency: emerald\n").unwrap();
    let edited: ShopSettings = store.load_or_create("shop.yaml").unwrap();
    assert_eq!(edited.currency, "emerald");
    assert_eq!(edited.prices, vec![1, 5, 10]);
}
