//! The three root locations and the per-package paths derived from them.

use std::path::{Path, PathBuf};

use crate::error::{PmError, Result};
use crate::fs::ensure_dir;
use crate::package::PackageDescriptor;

/// Binary root, source-cache root and state root.
///
/// Set once at startup and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    bin: PathBuf,
    cache: PathBuf,
    state: PathBuf,
}

impl Roots {
    /// Create roots from absolute paths.
    pub fn new(bin: PathBuf, cache: PathBuf, state: PathBuf) -> Result<Self> {
        for path in [&bin, &cache, &state] {
            if !path.is_absolute() {
                return Err(PmError::RelativeRoot { path: path.clone() });
            }
        }
        Ok(Self { bin, cache, state })
    }

    /// Lay out `bin`, `cache` and `state` below one base directory.
    pub fn under(base: &Path) -> Result<Self> {
        Self::new(base.join("bin"), base.join("cache"), base.join("state"))
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    pub fn cache(&self) -> &Path {
        &self.cache
    }

    pub fn state(&self) -> &Path {
        &self.state
    }

    /// Create all three roots, tolerating ones that already exist.
    pub fn ensure_all(&self) -> Result<()> {
        ensure_dir(&self.bin)?;
        ensure_dir(&self.cache)?;
        ensure_dir(&self.state)?;
        Ok(())
    }

    /// `<cache>/<name>`: the package's working copy.
    pub fn source_dir(&self, package: &PackageDescriptor) -> PathBuf {
        self.cache.join(package.name())
    }

    /// `<cache>/<name>/<name>`: where the recipe must leave its output.
    pub fn artifact_path(&self, package: &PackageDescriptor) -> PathBuf {
        self.source_dir(package).join(package.name())
    }

    /// `<bin>/<name>`: the published entry.
    pub fn published_path(&self, package: &PackageDescriptor) -> PathBuf {
        self.bin.join(package.name())
    }
}
