//! CLI for Updati.
//!
//! Refreshes Composer and npm lockfiles across every matching repository of
//! a GitHub account, delivering the result as a pull request or a direct push.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use updati::{
    resolve_token, PrAction, RunSummary, Runner, RunnerConfig, RunnerError, Settings,
};

/// Updati - Refresh dependency lockfiles across a GitHub account.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML settings file.
    #[arg(short, long, env = "UPDATI_CONFIG")]
    config: Option<PathBuf>,

    /// GitHub user or organization whose repositories are updated.
    #[arg(short, long)]
    owner: Option<String>,

    /// GitHub Personal Access Token. Falls back to GITHUB_TOKEN / INPUT_GITHUB_TOKEN.
    #[arg(short, long)]
    token: Option<String>,

    /// Regular expression matched against repository names (repeatable).
    #[arg(short = 'p', long = "pattern")]
    patterns: Vec<String>,

    /// Maximum concurrent repository updates.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Run updates locally without pushing or opening pull requests.
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Push directly instead of opening pull requests.
    #[arg(long)]
    push: bool,

    /// Branch to push to in direct-push mode.
    #[arg(short, long)]
    base_branch: Option<String>,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // Use aws-lc-rs for every TLS connection made by the GitHub client
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A TLS crypto provider was already installed");
    }

    // Parse arguments
    let args = Args::parse();
    let json = args.json;

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    // Run the main logic
    match run(args, &cancel).await {
        Ok(summary) => {
            if json {
                print_json(&summary);
            } else {
                print_summary(&summary);
            }

            if summary.all_success() {
                ExitCode::from(0)
            } else if summary.has_failures() || summary.cancelled {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Cancels `cancel` on the first Ctrl-C so in-flight updates wind down.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, cancelling remaining updates");
                cancel.cancel();
            }
            Err(e) => error!(error = %e, "Failed to listen for interrupt"),
        }
    });
}

/// Builds settings from the file, environment and flags, in that order.
fn build_settings(args: &Args) -> Result<Settings, RunnerError> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    settings.apply_env_overrides();

    if let Some(owner) = &args.owner {
        settings.owner = owner.clone();
    }
    if !args.patterns.is_empty() {
        settings.repo_patterns = args.patterns.clone();
    }
    if let Some(workers) = args.workers {
        settings.workers = workers;
    }
    if args.dry_run {
        settings.dry_run = true;
    }
    if args.push {
        settings.create_pr = false;
    }
    if let Some(branch) = &args.base_branch {
        settings.base_branch = Some(branch.clone());
    }

    Ok(settings)
}

/// Main execution logic.
async fn run(args: Args, cancel: &CancellationToken) -> Result<RunSummary, RunnerError> {
    let settings = build_settings(&args)?;
    let token = args
        .token
        .or_else(resolve_token)
        .ok_or(RunnerError::MissingToken)?;

    let config = RunnerConfig::new(settings, token)?;
    let runner = Runner::new(config)?;
    runner.run(cancel).await
}

fn print_json(summary: &RunSummary) {
    match serde_json::to_string_pretty(summary) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "Failed to serialize summary"),
    }
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Total repositories: {}", summary.total);
    println!("  Successful: {}", summary.successful);
    println!("  Updated: {}", summary.changed);
    println!("  Skipped: {}", summary.skipped);
    println!("  Failed: {}", summary.failed);
    if summary.cancelled {
        println!(
            "  Cancelled: {} of {} repositories not processed",
            summary.total - summary.outcomes.len(),
            summary.total
        );
    }

    let updated: Vec<_> = summary
        .outcomes
        .iter()
        .filter(|o| o.succeeded() && o.changed())
        .collect();
    if !updated.is_empty() {
        println!("\nUpdated repositories:");
        for outcome in updated {
            match &outcome.pull_request {
                Some(pr) => {
                    let action = match outcome.pull_request_action {
                        Some(PrAction::Updated) => "PR updated",
                        _ => "PR",
                    };
                    println!("  - {} ({action}: {})", outcome.repository, pr.url);
                }
                None if summary.dry_run => println!(
                    "  - {} (would update {})",
                    outcome.repository,
                    outcome.changed_files.join(", ")
                ),
                None => println!("  - {} (pushed to {})", outcome.repository, outcome.branch),
            }
            for warning in &outcome.warnings {
                println!("      warning: {warning}");
            }
        }
    }

    if summary.has_failures() {
        println!("\nFailed repositories:");
        for outcome in &summary.outcomes {
            if let Some(error) = outcome.error() {
                println!("  - {}: {error}", outcome.repository);
            }
        }
    }
}
