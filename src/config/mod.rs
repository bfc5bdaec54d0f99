//! Configuration management for driftcheck.
//!
//! Configuration is plain YAML. A global file (`~/.config/driftcheck/config.yml`)
//! is layered under an optional project file (`.driftcheck.yml` in the
//! validated root); anything neither file sets falls back to built-in defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::{GLOBAL_CONFIG_PATH, PROJECT_CONFIG_FILE};

pub mod defaults;

pub use defaults::*;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// File name of the drift data files to discover under the root
    #[serde(default = "defaults::default_data_file")]
    pub data_file: String,
    /// Entry keys with structural meaning; every other key is a test path
    #[serde(default = "defaults::default_reserved_keys")]
    pub reserved_keys: Vec<ReservedKey>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: defaults::default_data_file(),
            reserved_keys: defaults::default_reserved_keys(),
        }
    }
}

impl Config {
    /// Load configuration for `root` with full merge semantics.
    /// Merge order (later overrides earlier):
    /// 1. Global config (~/.config/driftcheck/config.yml)
    /// 2. Project config (<root>/.driftcheck.yml)
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_merged_from(
            global_config_path().as_deref(),
            &root.join(PROJECT_CONFIG_FILE),
        )
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        // An empty document means "all defaults"
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse config")?
        };

        config.validate()?;

        Ok(config)
    }

    /// Load merged configuration from the given global and project paths.
    /// Either file may be absent.
    pub fn load_merged_from(global_path: Option<&Path>, project_path: &Path) -> Result<Self> {
        let global_config = global_path
            .filter(|p| p.exists())
            .map(PartialConfig::load_from)
            .transpose()?
            .unwrap_or_default();

        let project_config = Some(project_path)
            .filter(|p| p.exists())
            .map(PartialConfig::load_from)
            .transpose()?
            .unwrap_or_default();

        let config = global_config.merge_with(project_config);
        config.validate()?;

        Ok(config)
    }

    /// Check the structural invariants of the reserved key vocabulary.
    pub fn validate(&self) -> Result<()> {
        if self.data_file.trim().is_empty() {
            anyhow::bail!("data_file must not be empty");
        }

        let mut seen = HashSet::new();
        for key in &self.reserved_keys {
            if key.name.is_empty() {
                anyhow::bail!("reserved_keys entries must have a non-empty name");
            }
            if !seen.insert(key.name.as_str()) {
                anyhow::bail!("reserved key '{}' is declared more than once", key.name);
            }
        }

        Ok(())
    }

    pub fn reserved(&self) -> ReservedKeys<'_> {
        ReservedKeys::new(&self.reserved_keys)
    }
}

/// Returns the path to the global config file at ~/.config/driftcheck/config.yml
pub fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(GLOBAL_CONFIG_PATH))
}

/// Partial config for merging - all fields optional
#[derive(Debug, Deserialize, Default)]
struct PartialConfig {
    pub data_file: Option<String>,
    pub reserved_keys: Option<Vec<ReservedKey>>,
}

impl PartialConfig {
    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content).context("Failed to parse config")
    }

    /// Merge this global config with a project config, returning the merged result.
    /// Values from the project config take precedence over global.
    fn merge_with(self, project: PartialConfig) -> Config {
        Config {
            data_file: project
                .data_file
                .or(self.data_file)
                .unwrap_or_else(defaults::default_data_file),
            // The reserved vocabulary is replaced wholesale, never unioned
            reserved_keys: project
                .reserved_keys
                .or(self.reserved_keys)
                .unwrap_or_else(defaults::default_reserved_keys),
        }
    }
}
