//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::build::EngineOptions;
use crate::config::ConfigStore;
use crate::git::GitClient;
use crate::orchestration::Orchestrator;
use crate::package::PackageRegistry;
use crate::process::CommandRunner;
use crate::roots::Roots;
use crate::state::StateProbe;
use crate::status::{StatusReport, collect_status};
use crate::version::VersionComparator;

/// Everything resolved from configuration at startup.
///
/// Frontends create this once and hand pieces of it to the engine; the
/// engine itself never reads configuration.
#[derive(Debug, Clone)]
pub struct AppContext {
    config_path: PathBuf,
    registry: PackageRegistry,
    roots: Roots,
    options: EngineOptions,
}

impl AppContext {
    pub fn new(
        config_path: PathBuf,
        registry: PackageRegistry,
        roots: Roots,
        options: EngineOptions,
    ) -> Self {
        Self {
            config_path,
            registry,
            roots,
            options,
        }
    }

    /// Load pm.toml through `store` and resolve registry, roots and options.
    pub fn load(store: &ConfigStore) -> anyhow::Result<Self> {
        let config = store.load()?;
        let registry = config.registry()?;
        let roots = store.roots(&config)?;
        Ok(Self::new(
            store.config_path().to_path_buf(),
            registry,
            roots,
            config.engine_options(),
        ))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn registry(&self) -> &PackageRegistry {
        &self.registry
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// An orchestrator owning a copy of the registry.
    pub fn orchestrator(&self, runner: Arc<dyn CommandRunner>) -> Orchestrator {
        Orchestrator::new(
            self.registry.clone(),
            self.roots.clone(),
            self.options,
            runner,
        )
    }

    /// Classify every package; with a runner, also compare revisions.
    pub fn status(&self, runner: Option<&dyn CommandRunner>) -> StatusReport {
        let probe = StateProbe::new(&self.roots);
        let comparator = runner.map(|runner| {
            VersionComparator::new(
                &self.roots,
                GitClient::new(runner, self.options.command_timeout),
            )
        });
        collect_status(&self.registry, &probe, comparator.as_ref())
    }
}
