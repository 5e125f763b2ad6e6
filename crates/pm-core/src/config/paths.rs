//! Default locations for the config file and the roots.

use std::path::{Path, PathBuf};

use crate::error::PmError;
use crate::roots::Roots;

use super::PathsConfig;

/// `<config_dir>/pm/pm.toml`, e.g. `~/.config/pm/pm.toml` on Linux.
pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(dir.join("pm").join("pm.toml"))
}

/// `<data_dir>/pm`, e.g. `~/.local/share/pm` on Linux.
pub fn default_data_dir() -> anyhow::Result<PathBuf> {
    let dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dir.join("pm"))
}

/// Resolve the roots, filling unset entries from `data_dir`.
pub fn resolve_roots(paths: &PathsConfig, data_dir: &Path) -> Result<Roots, PmError> {
    let pick = |configured: &Option<PathBuf>, default: &str| {
        configured
            .clone()
            .unwrap_or_else(|| data_dir.join(default))
    };
    Roots::new(
        pick(&paths.bin, "bin"),
        pick(&paths.cache, "cache"),
        pick(&paths.state, "state"),
    )
}
