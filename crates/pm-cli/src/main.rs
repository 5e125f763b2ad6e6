//! pm - minimal source-based package manager
//!
//! Usage:
//!   pm                # Clone, build and publish every configured package
//!   pm sync           # Same as above
//!   pm list           # Show configured packages
//!   pm status         # Show what a sync would do

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pm_core::config::ConfigStore;
use pm_core::context::AppContext;
use pm_core::orchestration::SyncReport;
use pm_core::process::SystemRunner;
use pm_core::status::{PackageState, PackageStatus, StatusReport};

#[derive(Parser)]
#[command(name = "pm")]
#[command(about = "Minimal source-based package manager", long_about = None)]
struct Cli {
    /// Path to pm.toml (defaults to ~/.config/pm/pm.toml)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install missing packages and rebuild stale ones (default)
    Sync,

    /// List configured packages
    List,

    /// Show the local state of every package
    Status {
        /// Fetch upstream and report whether installed packages are stale
        #[arg(long)]
        check_updates: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let store = match cli.config {
        Some(path) => ConfigStore::from_config_path(path)?,
        None => ConfigStore::from_default()?,
    };
    let ctx = AppContext::load(&store)?;
    tracing::debug!(config = %ctx.config_path().display(), packages = ctx.registry().len(), "loaded configuration");

    match cli.command.unwrap_or(Commands::Sync) {
        Commands::Sync => run_sync(&ctx),
        Commands::List => {
            run_list(&ctx);
            Ok(())
        }
        Commands::Status {
            check_updates,
            format,
        } => run_status(&ctx, check_updates, format),
    }
}

fn run_sync(ctx: &AppContext) -> Result<()> {
    if ctx.registry().is_empty() {
        println!(
            "No packages configured. Add [[package]] entries to {}",
            ctx.config_path().display()
        );
        return Ok(());
    }

    let orchestrator = ctx.orchestrator(Arc::new(SystemRunner::new()));
    let report = orchestrator.run()?;
    print_sync_report(&report);

    let code = sync_exit_code(&report);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Non-zero when any package failed.
fn sync_exit_code(report: &SyncReport) -> i32 {
    if report.has_failures() { 1 } else { 0 }
}

fn print_sync_report(report: &SyncReport) {
    println!();
    for result in &report.results {
        match &result.outcome {
            Ok(outcome) => println!(
                "  {} {:<24} {}",
                style("✓").green(),
                result.name,
                outcome.as_str()
            ),
            Err(err) => println!(
                "  {} {:<24} {}",
                style("✗").red(),
                result.name,
                style(err).red()
            ),
        }
    }

    let failed = report.failures().count();
    println!();
    println!(
        "{} packages, {} built, {} failed",
        report.results.len(),
        report.built(),
        failed
    );
}

fn run_list(ctx: &AppContext) {
    println!("Configured packages:");
    for package in ctx.registry() {
        println!(
            "  - {} ({}) [{}]",
            style(package.name()).bold(),
            package.source(),
            package.branch()
        );
    }
}

fn run_status(ctx: &AppContext, check_updates: bool, format: OutputFormat) -> Result<()> {
    let runner = SystemRunner::new();
    let report = if check_updates {
        ctx.status(Some(&runner))
    } else {
        ctx.status(None)
    };

    match format {
        OutputFormat::Table => print_status_table(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn print_status_table(report: &StatusReport) {
    println!("{:<24} {:<26} {:<10} SOURCE", "NAME", "STATE", "BRANCH");
    for package in &report.packages {
        println!("{}", status_row(package));
        if let Some(err) = &package.error {
            println!("    {}", style(err).red());
        }
    }

    let summary = &report.summary;
    println!();
    println!(
        "{} packages, {} installed, {} stale, {} need attention",
        summary.total, summary.installed, summary.stale, summary.issues
    );
}

fn status_row(package: &PackageStatus) -> String {
    let state = match package.state {
        PackageState::Installed | PackageState::Current => {
            style(package.state.as_str()).green()
        }
        PackageState::Stale | PackageState::Cloned | PackageState::InstalledWithoutSource => {
            style(package.state.as_str()).yellow()
        }
        PackageState::NotCloned => style(package.state.as_str()).dim(),
        PackageState::Error => style(package.state.as_str()).red(),
    };
    format!(
        "{:<24} {:<26} {:<10} {}",
        package.name, state, package.branch, package.source
    )
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, OutputFormat, status_row, sync_exit_code};
    use clap::Parser;
    use pm_core::error::PmError;
    use pm_core::fs::PublishMode;
    use pm_core::orchestration::{PackageOutcome, PackageResult, SyncReport};
    use pm_core::status::{PackageState, PackageStatus};
    use std::path::Path;

    #[test]
    fn no_subcommand_means_sync() {
        let cli = Cli::try_parse_from(["pm"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(
            cli.command.unwrap_or(Commands::Sync),
            Commands::Sync
        ));
    }

    #[test]
    fn sync_and_list_parse() {
        let cli = Cli::try_parse_from(["pm", "sync"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Sync)));

        let cli = Cli::try_parse_from(["pm", "list"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::List)));
    }

    #[test]
    fn config_is_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from(["pm", "list", "--config", "/tmp/pm.toml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/pm.toml")));
        assert!(matches!(cli.command, Some(Commands::List)));
    }

    #[test]
    fn config_is_accepted_before_the_subcommand() {
        let cli = Cli::try_parse_from(["pm", "-c", "/tmp/pm.toml", "sync"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/pm.toml")));
    }

    #[test]
    fn status_defaults_to_table_without_update_check() {
        let cli = Cli::try_parse_from(["pm", "status"]).unwrap();
        match cli.command {
            Some(Commands::Status {
                check_updates,
                format,
            }) => {
                assert!(!check_updates);
                assert!(matches!(format, OutputFormat::Table));
            }
            _ => panic!("expected the status command"),
        }
    }

    #[test]
    fn status_with_updates_and_json_parses() {
        let args = ["pm", "status", "--check-updates", "--format", "json"];

        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Some(Commands::Status {
                check_updates,
                format,
            }) => {
                assert!(check_updates);
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("expected the status command"),
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result = Cli::try_parse_from(["pm", "status", "--format", "yaml"]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        let result = Cli::try_parse_from(["pm", "remove", "tool"]);
        assert!(result.is_err());
    }

    #[test]
    fn exit_code_is_zero_when_every_package_succeeded() {
        let report = SyncReport {
            results: vec![
                PackageResult {
                    name: "tool".to_string(),
                    outcome: Ok(PackageOutcome::Installed {
                        mode: PublishMode::Hardlink,
                    }),
                },
                PackageResult {
                    name: "other".to_string(),
                    outcome: Ok(PackageOutcome::UpToDate),
                },
            ],
        };
        assert_eq!(sync_exit_code(&report), 0);
        assert_eq!(sync_exit_code(&SyncReport::default()), 0);
    }

    #[test]
    fn exit_code_is_one_when_a_package_failed() {
        let report = SyncReport {
            results: vec![
                PackageResult {
                    name: "broken".to_string(),
                    outcome: Err(PmError::EmptyRecipe {
                        package: "broken".to_string(),
                    }),
                },
                PackageResult {
                    name: "tool".to_string(),
                    outcome: Ok(PackageOutcome::UpToDate),
                },
            ],
        };
        assert_eq!(sync_exit_code(&report), 1);
    }

    fn status(name: &str, state: PackageState) -> PackageStatus {
        PackageStatus {
            name: name.to_string(),
            source: format!("https://example.com/{name}.git"),
            branch: "main".to_string(),
            recipe: "make".to_string(),
            state,
            local_revision: None,
            remote_revision: None,
            error: None,
        }
    }

    #[test]
    fn status_columns_line_up_with_colors_enabled() {
        console::set_colors_enabled(true);

        let rows: Vec<String> = [
            status("tool", PackageState::Current),
            status("other", PackageState::InstalledWithoutSource),
            status("third", PackageState::NotCloned),
        ]
        .iter()
        .map(status_row)
        .collect();

        for row in &rows {
            let plain = console::strip_ansi_codes(row);
            assert_eq!(plain.find("main"), Some(24 + 1 + 26 + 1), "row: {plain:?}");
            assert_eq!(plain.find("https://"), Some(24 + 1 + 26 + 1 + 10 + 1));
        }
    }
}
