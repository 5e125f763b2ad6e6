//! The per-package converge protocol and the sequential run over the registry.

use std::any::Any;
use std::sync::Arc;
use std::thread;

use tracing::{error, info, info_span};

use crate::build::{Builder, EngineOptions};
use crate::error::{PmError, Result};
use crate::git::GitClient;
use crate::package::{PackageDescriptor, PackageRegistry};
use crate::process::CommandRunner;
use crate::roots::Roots;
use crate::state::{LocalState, StateProbe};
use crate::version::VersionComparator;

use super::report::{PackageOutcome, PackageResult, SyncReport};

/// Owns the registry and drives each package to "installed and current".
///
/// Packages are handled one at a time in registry order. Each package's
/// sequence runs on its own thread and is joined before the next starts, so
/// a failure or panic stays inside that package and log output never
/// interleaves.
pub struct Orchestrator {
    registry: PackageRegistry,
    roots: Roots,
    options: EngineOptions,
    runner: Arc<dyn CommandRunner>,
}

impl Orchestrator {
    pub fn new(
        registry: PackageRegistry,
        roots: Roots,
        options: EngineOptions,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            registry,
            roots,
            options,
            runner,
        }
    }

    pub fn registry(&self) -> &PackageRegistry {
        &self.registry
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn probe(&self) -> StateProbe<'_> {
        StateProbe::new(&self.roots)
    }

    pub fn comparator(&self) -> VersionComparator<'_> {
        VersionComparator::new(&self.roots, self.git())
    }

    pub fn builder(&self) -> Builder<'_> {
        Builder::new(&self.roots, self.runner.as_ref(), self.options)
    }

    fn git(&self) -> GitClient<'_> {
        GitClient::new(self.runner.as_ref(), self.options.command_timeout)
    }

    /// Ensure the roots, then converge every package in order.
    ///
    /// Per-package failures are collected in the report. Only a root that
    /// cannot be created or a package task that cannot be started ends the
    /// run early with an error.
    pub fn run(&self) -> Result<SyncReport> {
        self.roots.ensure_all()?;

        let mut report = SyncReport::default();
        for package in &self.registry {
            info!("[NAME] {}", package.name());
            let result = self.run_isolated(package)?;
            if let Err(err) = &result.outcome {
                error!(package = package.name(), kind = err.kind(), "{}", err);
            }
            report.results.push(result);
        }
        Ok(report)
    }

    /// Run one package's sequence on its own thread and wait for it.
    fn run_isolated(&self, package: &PackageDescriptor) -> Result<PackageResult> {
        thread::scope(|scope| {
            let handle = thread::Builder::new()
                .name(format!("pm-{}", package.name()))
                .spawn_scoped(scope, || {
                    let span = info_span!("package", name = package.name());
                    let _guard = span.enter();
                    self.converge(package)
                })
                .map_err(|source| PmError::Spawn {
                    package: package.name().to_string(),
                    source,
                })?;

            let outcome = handle.join().unwrap_or_else(|payload| {
                Err(PmError::Panicked {
                    package: package.name().to_string(),
                    message: panic_message(payload.as_ref()),
                })
            });
            Ok(PackageResult {
                name: package.name().to_string(),
                outcome,
            })
        })
    }

    /// Classify the package and perform the matching transition.
    ///
    /// | state                  | action                       |
    /// |------------------------|------------------------------|
    /// | not cloned             | clone, build, publish        |
    /// | cloned only            | build, publish               |
    /// | installed, current     | nothing                      |
    /// | installed, stale       | fetch, reset, build, publish |
    /// | installed, no clone    | clone, build, republish      |
    pub fn converge(&self, package: &PackageDescriptor) -> Result<PackageOutcome> {
        let builder = self.builder();
        match self.probe().classify(package)? {
            LocalState::NotCloned | LocalState::ClonedOnly => {
                let mode = builder.build(package)?;
                Ok(PackageOutcome::Installed { mode })
            }
            LocalState::InstalledWithoutSource => {
                info!(
                    "package {} is published but its source is missing, rebuilding",
                    package.name()
                );
                let mode = builder.build(package)?;
                Ok(PackageOutcome::Rebuilt { mode })
            }
            LocalState::Installed => {
                if !self.comparator().needs_update(package)? {
                    info!("[SKIP] package {} already updated", package.name());
                    return Ok(PackageOutcome::UpToDate);
                }
                let mode = builder.apply_update(package)?;
                Ok(PackageOutcome::Updated { mode })
            }
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registry", &self.registry)
            .field("roots", &self.roots)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
