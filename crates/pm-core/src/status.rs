//! Read-only status collection for registered packages.
//!
//! Nothing is built or published here. With revision checks enabled the
//! working copies are fetched, which only updates remote-tracking refs.

use serde::Serialize;

use crate::package::PackageRegistry;
use crate::state::{LocalState, StateProbe};
use crate::version::VersionComparator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageState {
    NotCloned,
    Cloned,
    Installed,
    InstalledWithoutSource,
    Current,
    Stale,
    Error,
}

impl PackageState {
    pub fn as_str(self) -> &'static str {
        match self {
            PackageState::NotCloned => "not-cloned",
            PackageState::Cloned => "cloned",
            PackageState::Installed => "installed",
            PackageState::InstalledWithoutSource => "installed-without-source",
            PackageState::Current => "current",
            PackageState::Stale => "stale",
            PackageState::Error => "error",
        }
    }

    /// Whether a sync would do work or has failed for this state.
    pub fn needs_attention(self) -> bool {
        !matches!(self, PackageState::Installed | PackageState::Current)
    }
}

impl From<LocalState> for PackageState {
    fn from(state: LocalState) -> Self {
        match state {
            LocalState::NotCloned => PackageState::NotCloned,
            LocalState::ClonedOnly => PackageState::Cloned,
            LocalState::Installed => PackageState::Installed,
            LocalState::InstalledWithoutSource => PackageState::InstalledWithoutSource,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageStatus {
    pub name: String,
    pub source: String,
    pub branch: String,
    pub recipe: String,
    pub state: PackageState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub installed: usize,
    pub stale: usize,
    pub issues: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub packages: Vec<PackageStatus>,
    pub summary: StatusSummary,
}

/// Classify every package without acting on it.
///
/// When `comparator` is given, installed packages are further classified as
/// current or stale.
pub fn collect_status(
    registry: &PackageRegistry,
    probe: &StateProbe<'_>,
    comparator: Option<&VersionComparator<'_>>,
) -> StatusReport {
    let mut packages = Vec::with_capacity(registry.len());

    for package in registry {
        let mut status = PackageStatus {
            name: package.name().to_string(),
            source: package.source().to_string(),
            branch: package.branch().to_string(),
            recipe: package.recipe().to_string(),
            state: PackageState::Error,
            local_revision: None,
            remote_revision: None,
            error: None,
        };

        match (probe.classify(package), comparator) {
            (Ok(LocalState::Installed), Some(comparator)) => {
                match comparator.check(package) {
                    Ok(check) => {
                        status.state = if check.is_stale() {
                            PackageState::Stale
                        } else {
                            PackageState::Current
                        };
                        status.local_revision = Some(check.local);
                        status.remote_revision = Some(check.remote);
                    }
                    Err(err) => status.error = Some(err.to_string()),
                }
            }
            (Ok(state), _) => status.state = state.into(),
            (Err(err), _) => status.error = Some(err.to_string()),
        }

        packages.push(status);
    }

    let summary = StatusSummary {
        total: packages.len(),
        installed: packages
            .iter()
            .filter(|p| {
                matches!(
                    p.state,
                    PackageState::Installed | PackageState::Current | PackageState::Stale
                )
            })
            .count(),
        stale: packages
            .iter()
            .filter(|p| p.state == PackageState::Stale)
            .count(),
        issues: packages
            .iter()
            .filter(|p| p.state.needs_attention())
            .count(),
    };

    StatusReport { packages, summary }
}
