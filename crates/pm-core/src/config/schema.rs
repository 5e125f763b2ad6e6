//! Configuration schema for pm.toml

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::build::EngineOptions;
use crate::error::PmError;
use crate::fs::PublishMode;
use crate::package::{DEFAULT_BRANCH, DEFAULT_RECIPE, PackageDescriptor, PackageRegistry};

/// Root configuration structure for pm.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PmConfig {
    /// Root directory overrides
    #[serde(default)]
    pub paths: PathsConfig,

    /// Engine settings
    #[serde(default)]
    pub settings: SettingsConfig,

    /// Packages, in the order they are processed
    #[serde(default, rename = "package")]
    pub packages: Vec<PackageEntry>,
}

/// Absolute root directories; unset entries fall back to the data directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathsConfig {
    #[serde(default)]
    pub bin: Option<PathBuf>,
    #[serde(default)]
    pub cache: Option<PathBuf>,
    #[serde(default)]
    pub state: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// Seconds each external command may run; 0 disables the limit
    #[serde(default = "default_command_timeout")]
    pub command_timeout: u64,

    /// How artifacts are placed into the bin root
    #[serde(default)]
    pub publish: PublishMode,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            command_timeout: default_command_timeout(),
            publish: PublishMode::default(),
        }
    }
}

fn default_command_timeout() -> u64 {
    3600
}

/// One `[[package]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageEntry {
    pub name: String,

    /// Git URL or local repository path
    pub source: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    /// Build command, split on spaces
    #[serde(default = "default_recipe")]
    pub recipe: String,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_recipe() -> String {
    DEFAULT_RECIPE.to_string()
}

impl TryFrom<&PackageEntry> for PackageDescriptor {
    type Error = PmError;

    fn try_from(entry: &PackageEntry) -> Result<Self, Self::Error> {
        PackageDescriptor::new(entry.name.clone(), entry.source.clone())?
            .with_branch(entry.branch.clone())?
            .with_recipe(&entry.recipe)
    }
}

impl PmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every entry and the configured paths.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.packages {
            if entry.source.trim().is_empty() {
                anyhow::bail!("Package '{}' has an empty source", entry.name);
            }
            PackageDescriptor::try_from(entry)
                .with_context(|| format!("Invalid package '{}'", entry.name))?;
            if !seen.insert(entry.name.as_str()) {
                anyhow::bail!("Package '{}' is declared more than once", entry.name);
            }
        }

        for (key, path) in [
            ("bin", &self.paths.bin),
            ("cache", &self.paths.cache),
            ("state", &self.paths.state),
        ] {
            if let Some(path) = path
                && !path.is_absolute()
            {
                anyhow::bail!(
                    "paths.{} must be an absolute path, got {}",
                    key,
                    path.display()
                );
            }
        }
        Ok(())
    }

    /// Build the ordered registry from the `[[package]]` tables.
    pub fn registry(&self) -> anyhow::Result<PackageRegistry> {
        let mut registry = PackageRegistry::new();
        for entry in &self.packages {
            let package = PackageDescriptor::try_from(entry)
                .with_context(|| format!("Invalid package '{}'", entry.name))?;
            registry.add(package)?;
        }
        Ok(registry)
    }

    pub fn engine_options(&self) -> EngineOptions {
        let command_timeout = match self.settings.command_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        EngineOptions {
            command_timeout,
            publish_mode: self.settings.publish,
        }
    }
}
