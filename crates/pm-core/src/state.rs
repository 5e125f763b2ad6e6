//! On-disk classification of a package.
//!
//! Nothing here is cached: every query looks at the filesystem again.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{PmError, Result};
use crate::package::PackageDescriptor;
use crate::roots::Roots;

/// What exists locally for a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocalState {
    /// Neither a working copy nor a published entry.
    NotCloned,
    /// A working copy without a published entry, e.g. after an interrupted run.
    ClonedOnly,
    /// Working copy and published entry both present.
    Installed,
    /// A published entry whose working copy has been removed.
    InstalledWithoutSource,
}

/// Existence checks under the cache and bin roots.
#[derive(Debug, Clone, Copy)]
pub struct StateProbe<'a> {
    roots: &'a Roots,
}

impl<'a> StateProbe<'a> {
    pub fn new(roots: &'a Roots) -> Self {
        Self { roots }
    }

    /// Whether `<cache>/<name>` is a directory.
    pub fn is_cloned(&self, package: &PackageDescriptor) -> Result<bool> {
        let path = self.roots.source_dir(package);
        Ok(probe(&path, false)?.is_some_and(|meta| meta.is_dir()))
    }

    /// Whether anything exists at `<bin>/<name>`.
    pub fn is_installed(&self, package: &PackageDescriptor) -> Result<bool> {
        let path = self.roots.published_path(package);
        Ok(probe(&path, true)?.is_some())
    }

    pub fn classify(&self, package: &PackageDescriptor) -> Result<LocalState> {
        let cloned = self.is_cloned(package)?;
        let installed = self.is_installed(package)?;
        let state = match (cloned, installed) {
            (false, false) => LocalState::NotCloned,
            (true, false) => LocalState::ClonedOnly,
            (true, true) => LocalState::Installed,
            (false, true) => LocalState::InstalledWithoutSource,
        };
        debug!(package = package.name(), ?state, "classified package");
        Ok(state)
    }
}

/// Stat `path`, mapping "not found" to `None` and anything else to a probe error.
fn probe(path: &Path, lstat: bool) -> Result<Option<fs::Metadata>> {
    let result = if lstat {
        fs::symlink_metadata(path)
    } else {
        fs::metadata(path)
    };
    match result {
        Ok(meta) => Ok(Some(meta)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PmError::Probe {
            path: path.to_path_buf(),
            source,
        }),
    }
}
