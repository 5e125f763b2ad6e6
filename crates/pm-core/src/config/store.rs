//! Config store for loading pm.toml.

use std::path::{Path, PathBuf};

use crate::roots::Roots;

use super::{PmConfig, parser, paths};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
    data_dir: PathBuf,
}

impl ConfigStore {
    /// Store at the platform default locations.
    pub fn from_default() -> anyhow::Result<Self> {
        Ok(Self::from_paths(
            paths::default_config_path()?,
            paths::default_data_dir()?,
        ))
    }

    /// Store for an explicit config file, with roots defaulting under the
    /// platform data directory.
    pub fn from_config_path(config_path: PathBuf) -> anyhow::Result<Self> {
        Ok(Self::from_paths(config_path, paths::default_data_dir()?))
    }

    pub fn from_paths(config_path: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            config_path,
            data_dir,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load the config; a missing file yields an empty package list.
    pub fn load(&self) -> anyhow::Result<PmConfig> {
        if !self.config_path.exists() {
            return Ok(PmConfig::new());
        }
        parser::parse_pm_toml(&self.config_path)
    }

    /// Roots for `config`, defaulting unset entries under the data directory.
    pub fn roots(&self, config: &PmConfig) -> anyhow::Result<Roots> {
        Ok(paths::resolve_roots(&config.paths, &self.data_dir)?)
    }
}
