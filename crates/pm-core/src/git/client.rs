use std::path::Path;
use std::time::Duration;

use crate::error::CommandError;
use crate::process::{CommandRunner, CommandSpec};

/// Issues the git commands the engine needs through a [`CommandRunner`].
///
/// Commands that act on a working copy take its directory explicitly.
#[derive(Clone, Copy)]
pub struct GitClient<'a> {
    runner: &'a dyn CommandRunner,
    timeout: Option<Duration>,
}

impl<'a> GitClient<'a> {
    pub fn new(runner: &'a dyn CommandRunner, timeout: Option<Duration>) -> Self {
        Self { runner, timeout }
    }

    /// `git clone -b <branch> -- <url> <dest>`
    pub fn clone_branch(&self, url: &str, branch: &str, dest: &Path) -> Result<(), CommandError> {
        let spec = self.git().args(["clone", "-b", branch, "--", url]).arg(dest);
        self.runner.run(&spec)
    }

    /// `git fetch --all`
    pub fn fetch_all(&self, repo: &Path) -> Result<(), CommandError> {
        let spec = self.git().args(["fetch", "--all"]).current_dir(repo);
        self.runner.run(&spec)
    }

    /// `git rev-parse <rev>`, returning the commit id.
    pub fn rev_parse(&self, repo: &Path, rev: &str) -> Result<String, CommandError> {
        let spec = self.git().args(["rev-parse", rev]).current_dir(repo);
        self.runner.capture_line(&spec)
    }

    /// `git reset --hard <rev>`
    pub fn reset_hard(&self, repo: &Path, rev: &str) -> Result<(), CommandError> {
        let spec = self.git().args(["reset", "--hard", rev]).current_dir(repo);
        self.runner.run(&spec)
    }

    fn git(&self) -> CommandSpec {
        CommandSpec::new("git").timeout(self.timeout)
    }
}

impl std::fmt::Debug for GitClient<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
