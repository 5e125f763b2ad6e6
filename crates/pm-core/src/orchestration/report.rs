//! Per-package results of a sync run.

use crate::error::PmError;
use crate::fs::PublishMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageOutcome {
    /// Built and published for the first time.
    Installed { mode: PublishMode },
    /// Published entry existed without a working copy; cloned and rebuilt.
    Rebuilt { mode: PublishMode },
    /// Upstream had moved; reset, rebuilt and republished.
    Updated { mode: PublishMode },
    /// Already at the upstream tip; nothing ran.
    UpToDate,
}

impl PackageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageOutcome::Installed { .. } => "installed",
            PackageOutcome::Rebuilt { .. } => "rebuilt",
            PackageOutcome::Updated { .. } => "updated",
            PackageOutcome::UpToDate => "up-to-date",
        }
    }
}

#[derive(Debug)]
pub struct PackageResult {
    pub name: String,
    pub outcome: Result<PackageOutcome, PmError>,
}

impl PackageResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Results in registry order.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub results: Vec<PackageResult>,
}

impl SyncReport {
    pub fn get(&self, name: &str) -> Option<&PackageResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &PmError)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            Ok(_) => None,
            Err(err) => Some((r.name.as_str(), err)),
        })
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| !r.is_ok())
    }

    /// Number of packages that ran a build.
    pub fn built(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(&r.outcome, Ok(outcome) if *outcome != PackageOutcome::UpToDate))
            .count()
    }
}
