//! Version-control operations, issued as `git` subprocesses.

mod client;

pub use client::GitClient;
