//! End-to-end sync against a local upstream repository and the real `git`.

#![cfg(unix)]

mod support;

use std::fs;
use std::sync::Arc;

use pm_core::build::EngineOptions;
use pm_core::orchestration::{Orchestrator, PackageOutcome};
use pm_core::package::{PackageDescriptor, PackageRegistry};
use pm_core::process::SystemRunner;
use pm_core::roots::Roots;
use tempfile::TempDir;

use support::git::{commit_all, head_commit, init_upstream};

#[test]
fn sync_installs_skips_and_updates_from_upstream() {
    let temp = TempDir::new().unwrap();
    let upstream_dir = temp.path().join("upstream");
    let upstream = init_upstream(&upstream_dir);
    fs::write(upstream_dir.join("tool.sh"), "v1\n").unwrap();
    commit_all(&upstream, "first");

    let package = PackageDescriptor::new("tool", upstream_dir.to_string_lossy())
        .unwrap()
        .with_recipe("cp tool.sh tool")
        .unwrap();
    let roots = Roots::under(&temp.path().join("pm")).unwrap();
    let orchestrator = Orchestrator::new(
        PackageRegistry::from_packages(vec![package]).unwrap(),
        roots.clone(),
        EngineOptions::default(),
        Arc::new(SystemRunner::new()),
    );
    let published = roots.bin().join("tool");

    let first = orchestrator.run().unwrap();
    assert!(matches!(
        first.get("tool").unwrap().outcome,
        Ok(PackageOutcome::Installed { .. })
    ));
    assert_eq!(fs::read_to_string(&published).unwrap(), "v1\n");

    let second = orchestrator.run().unwrap();
    assert!(matches!(
        second.get("tool").unwrap().outcome,
        Ok(PackageOutcome::UpToDate)
    ));

    fs::write(upstream_dir.join("tool.sh"), "v2\n").unwrap();
    let tip = commit_all(&upstream, "second");

    let third = orchestrator.run().unwrap();
    assert!(matches!(
        third.get("tool").unwrap().outcome,
        Ok(PackageOutcome::Updated { .. })
    ));
    assert_eq!(head_commit(&roots.cache().join("tool")), tip.to_string());
    assert_eq!(fs::read_to_string(&published).unwrap(), "v2\n");

    let fourth = orchestrator.run().unwrap();
    assert!(matches!(
        fourth.get("tool").unwrap().outcome,
        Ok(PackageOutcome::UpToDate)
    ));
}

#[test]
fn missing_branch_is_a_clone_error_for_that_package_only() {
    let temp = TempDir::new().unwrap();
    let upstream_dir = temp.path().join("upstream");
    let upstream = init_upstream(&upstream_dir);
    fs::write(upstream_dir.join("tool"), "tool\n").unwrap();
    commit_all(&upstream, "first");
    let source = upstream_dir.to_string_lossy().into_owned();

    let wrong = PackageDescriptor::new("wrong", source.clone())
        .unwrap()
        .with_branch("does-not-exist")
        .unwrap();
    let tool = PackageDescriptor::new("tool", source)
        .unwrap()
        .with_recipe("true")
        .unwrap();
    let roots = Roots::under(&temp.path().join("pm")).unwrap();
    let orchestrator = Orchestrator::new(
        PackageRegistry::from_packages(vec![wrong, tool]).unwrap(),
        roots.clone(),
        EngineOptions::default(),
        Arc::new(SystemRunner::new()),
    );

    let report = orchestrator.run().unwrap();

    let (name, err) = report.failures().next().unwrap();
    assert_eq!(name, "wrong");
    assert_eq!(err.kind(), "clone");
    assert!(report.get("tool").unwrap().is_ok());
    assert_eq!(fs::read_to_string(roots.bin().join("tool")).unwrap(), "tool\n");
}
