//! Converging every registered package to "installed and current".

pub mod orchestrator;
pub mod report;

pub use orchestrator::Orchestrator;
pub use report::{PackageOutcome, PackageResult, SyncReport};
