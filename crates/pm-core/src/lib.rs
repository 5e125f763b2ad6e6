//! pm Core Library
//!
//! Install/update engine for a minimal source-based package manager. Each
//! registered package is cloned into a cache, built with its recipe and
//! published into a shared bin directory; installed packages whose upstream
//! branch has moved are reset and rebuilt.

pub mod build;
pub mod config;
pub mod context;
pub mod error;
pub mod fs;
pub mod git;
pub mod orchestration;
pub mod package;
pub mod process;
pub mod roots;
pub mod state;
pub mod status;
pub mod version;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigStore, PackageEntry, PmConfig};
    pub use crate::context::AppContext;

    // Model
    pub use crate::package::{PackageDescriptor, PackageRegistry, Recipe};
    pub use crate::roots::Roots;

    // Engine
    pub use crate::build::{Builder, EngineOptions};
    pub use crate::error::{CommandError, PmError};
    pub use crate::fs::PublishMode;
    pub use crate::orchestration::{Orchestrator, PackageOutcome, PackageResult, SyncReport};
    pub use crate::process::{CommandRunner, CommandSpec, SystemRunner};
    pub use crate::state::{LocalState, StateProbe};
    pub use crate::version::VersionComparator;

    // Status
    pub use crate::status::{PackageState, PackageStatus, StatusReport};
}
