//! Error kinds for the install/update engine.
//!
//! `CommandError` describes a single external command that did not succeed.
//! `PmError` places such failures in the package step that produced them, so
//! callers can tell a failed clone from a failed recipe or a failed publish.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure of one external command invocation.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {}", describe_exit(.code))]
    Failed { command: String, code: Option<i32> },

    #[error("`{command}` timed out after {}s", .timeout.as_secs())]
    TimedOut { command: String, timeout: Duration },

    #[error("`{command}` produced no output")]
    NoOutput { command: String },

    #[error("i/o error while running `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// Errors raised by the package engine.
#[derive(Debug, Error)]
pub enum PmError {
    /// A root directory (or one of its ancestors) could not be created.
    #[error("failed to create directory {}: {source}", .path.display())]
    Initialization {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A root path was not absolute.
    #[error("root path must be absolute: {}", .path.display())]
    RelativeRoot { path: PathBuf },

    /// The isolated execution context for a package could not be started.
    #[error("failed to start isolated task for package {package}: {source}")]
    Spawn {
        package: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to clone package {package}: {source}")]
    Clone {
        package: String,
        #[source]
        source: CommandError,
    },

    #[error("recipe for package {package} failed: {source}")]
    Build {
        package: String,
        #[source]
        source: CommandError,
    },

    #[error("failed to resolve {revision} for package {package}: {source}")]
    RevisionQuery {
        package: String,
        revision: String,
        #[source]
        source: CommandError,
    },

    /// Fetching or resetting an existing working copy failed.
    #[error("failed to update working copy of package {package}: {source}")]
    Update {
        package: String,
        #[source]
        source: CommandError,
    },

    #[error("failed to publish {} as {}: {source}", .artifact.display(), .target.display())]
    Publish {
        package: String,
        artifact: PathBuf,
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A filesystem check failed for a reason other than "not found".
    #[error("failed to probe {}: {source}", .path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("package {package} panicked: {message}")]
    Panicked { package: String, message: String },

    #[error("invalid package name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("invalid branch {branch:?} for package {package}")]
    InvalidBranch { package: String, branch: String },

    #[error("recipe for package {package} is empty")]
    EmptyRecipe { package: String },

    #[error("package {0} is already registered")]
    DuplicatePackage(String),
}

impl PmError {
    /// Whether this error stops the whole run instead of a single package.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PmError::Initialization { .. } | PmError::Spawn { .. })
    }

    /// Short label naming the failed step.
    pub fn kind(&self) -> &'static str {
        match self {
            PmError::Initialization { .. } | PmError::RelativeRoot { .. } => "init",
            PmError::Spawn { .. } => "spawn",
            PmError::Clone { .. } => "clone",
            PmError::Build { .. } => "build",
            PmError::RevisionQuery { .. } => "revision",
            PmError::Update { .. } => "update",
            PmError::Publish { .. } => "publish",
            PmError::Probe { .. } => "probe",
            PmError::Panicked { .. } => "panic",
            PmError::InvalidName { .. }
            | PmError::InvalidBranch { .. }
            | PmError::EmptyRecipe { .. }
            | PmError::DuplicatePackage(_) => "config",
        }
    }
}

pub type Result<T, E = PmError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_command_mentions_exit_code() {
        let err = CommandError::Failed {
            command: "make".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "`make` exited with status 2");
    }

    #[test]
    fn signal_exit_is_described() {
        let err = CommandError::Failed {
            command: "make".to_string(),
            code: None,
        };
        assert_eq!(err.to_string(), "`make` exited with a signal");
    }

    #[test]
    fn only_init_and_spawn_are_fatal() {
        let init = PmError::Initialization {
            path: PathBuf::from("/x"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let build = PmError::Build {
            package: "tool".to_string(),
            source: CommandError::NoOutput {
                command: "make".to_string(),
            },
        };
        assert!(init.is_fatal());
        assert!(!build.is_fatal());
        assert_eq!(build.kind(), "build");
    }
}
