//! Clone, build and publish steps for one package.

use std::time::Duration;

use tracing::info;

use crate::error::{PmError, Result};
use crate::fs::{PublishMode, publish};
use crate::git::GitClient;
use crate::package::PackageDescriptor;
use crate::process::{CommandRunner, CommandSpec};
use crate::roots::Roots;
use crate::state::StateProbe;

/// Settings shared by every package step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Per-command limit; `None` waits indefinitely.
    pub command_timeout: Option<Duration>,
    pub publish_mode: PublishMode,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            command_timeout: Some(Duration::from_secs(3600)),
            publish_mode: PublishMode::default(),
        }
    }
}

/// Whether [`Builder::clone_package`] had anything to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneOutcome {
    Cloned,
    AlreadyCloned,
}

/// Executes the side-effecting steps of the install protocol.
pub struct Builder<'a> {
    roots: &'a Roots,
    runner: &'a dyn CommandRunner,
    options: EngineOptions,
}

impl<'a> Builder<'a> {
    pub fn new(roots: &'a Roots, runner: &'a dyn CommandRunner, options: EngineOptions) -> Self {
        Self {
            roots,
            runner,
            options,
        }
    }

    fn git(&self) -> GitClient<'a> {
        GitClient::new(self.runner, self.options.command_timeout)
    }

    /// Clone `source` at `branch` into `<cache>/<name>` unless already there.
    pub fn clone_package(&self, package: &PackageDescriptor) -> Result<CloneOutcome> {
        if StateProbe::new(self.roots).is_cloned(package)? {
            info!("Package {} already downloaded", package.name());
            return Ok(CloneOutcome::AlreadyCloned);
        }

        let dest = self.roots.source_dir(package);
        self.git()
            .clone_branch(package.source(), package.branch(), &dest)
            .map_err(|source| PmError::Clone {
                package: package.name().to_string(),
                source,
            })?;
        Ok(CloneOutcome::Cloned)
    }

    /// Run the recipe inside the working copy, then publish its artifact.
    ///
    /// Clones first when needed. A failing recipe stops before anything is
    /// published, leaving a previously published entry untouched.
    pub fn build(&self, package: &PackageDescriptor) -> Result<PublishMode> {
        self.clone_package(package)?;

        let dir = self.roots.source_dir(package);
        let recipe = package.recipe();
        let spec = CommandSpec::new(recipe.program())
            .args(recipe.args())
            .current_dir(&dir)
            .timeout(self.options.command_timeout);
        self.runner.run(&spec).map_err(|source| PmError::Build {
            package: package.name().to_string(),
            source,
        })?;

        let artifact = self.roots.artifact_path(package);
        let target = self.roots.published_path(package);
        publish(&artifact, &target, self.options.publish_mode).map_err(|source| {
            PmError::Publish {
                package: package.name().to_string(),
                artifact,
                target,
                source,
            }
        })
    }

    /// Move the working copy to the upstream tip and rebuild.
    pub fn apply_update(&self, package: &PackageDescriptor) -> Result<PublishMode> {
        let dir = self.roots.source_dir(package);
        let update_error = |source| PmError::Update {
            package: package.name().to_string(),
            source,
        };

        let git = self.git();
        git.fetch_all(&dir).map_err(update_error)?;
        git.reset_hard(&dir, &package.remote_ref())
            .map_err(update_error)?;

        self.build(package)
    }
}

impl std::fmt::Debug for Builder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("roots", &self.roots)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
