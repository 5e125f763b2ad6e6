//! Staleness detection against the upstream branch tip.

use tracing::{debug, info};

use crate::error::{PmError, Result};
use crate::git::GitClient;
use crate::package::PackageDescriptor;
use crate::roots::Roots;

/// Local and upstream commit ids of a working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionCheck {
    pub local: String,
    pub remote: String,
}

impl RevisionCheck {
    pub fn is_stale(&self) -> bool {
        self.local != self.remote
    }
}

/// Compares a working copy's `HEAD` with `origin/<branch>`.
#[derive(Debug, Clone, Copy)]
pub struct VersionComparator<'a> {
    roots: &'a Roots,
    git: GitClient<'a>,
}

impl<'a> VersionComparator<'a> {
    pub fn new(roots: &'a Roots, git: GitClient<'a>) -> Self {
        Self { roots, git }
    }

    /// Fetch all remotes, then read both revisions.
    ///
    /// The package must already be cloned. Any failure to fetch or to read a
    /// revision is returned as [`PmError::RevisionQuery`].
    pub fn check(&self, package: &PackageDescriptor) -> Result<RevisionCheck> {
        let dir = self.roots.source_dir(package);
        let remote_ref = package.remote_ref();
        let query_error = |revision: &str, source| PmError::RevisionQuery {
            package: package.name().to_string(),
            revision: revision.to_string(),
            source,
        };

        self.git
            .fetch_all(&dir)
            .map_err(|source| query_error(&remote_ref, source))?;
        let local = self
            .git
            .rev_parse(&dir, "HEAD")
            .map_err(|source| query_error("HEAD", source))?;
        let remote = self
            .git
            .rev_parse(&dir, &remote_ref)
            .map_err(|source| query_error(&remote_ref, source))?;

        debug!(package = package.name(), %local, %remote, "compared revisions");
        Ok(RevisionCheck { local, remote })
    }

    /// Whether the local revision differs from the upstream tip.
    pub fn needs_update(&self, package: &PackageDescriptor) -> Result<bool> {
        let check = self.check(package)?;
        if check.is_stale() {
            info!(
                package = package.name(),
                "{} is behind {} ({} -> {})",
                package.name(),
                package.remote_ref(),
                short(&check.local),
                short(&check.remote)
            );
        }
        Ok(check.is_stale())
    }
}

fn short(rev: &str) -> &str {
    rev.get(..8).unwrap_or(rev)
}
