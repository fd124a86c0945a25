//! Typed YAML files under a plugin's data directory.
//!
//! Missing files are created from the type's defaults; existing files are
//! layered over those defaults, so keys added in a newer version of a
//! settings struct pick up their default value.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::providers::{Format, Serialized, Yaml};
use figment::Figment;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

/// Reads and writes YAML settings files relative to a data directory.
#[derive(Debug, Clone)]
pub struct YamlConfigStore {
    root: PathBuf,
}

impl YamlConfigStore {
    /// Store reading and writing files under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of `file`.
    pub fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }

    /// Load `file`, writing `T::default()` to it first if it does not exist.
    pub fn load_or_create<T>(&self, file: &str) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let path = self.path(file);
        if !path.exists() {
            let value = T::default();
            self.save(file, &value)?;
            info!(path = %path.display(), "created default configuration file");
            return Ok(value);
        }

        let value = Figment::new()
            .merge(Serialized::defaults(T::default()))
            .merge(Yaml::file(&path))
            .extract()
            .with_context(|| format!("Failed to load {}", path.display()))?;
        debug!(path = %path.display(), "loaded configuration file");
        Ok(value)
    }

    /// Write `value` to `file`, creating parent directories as needed.
    pub fn save<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let path = self.path(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(value).context("Failed to serialize configuration")?;
        fs::write(&path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
