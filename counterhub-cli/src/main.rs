// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Counterhub CLI - harvest usage-statistics reports from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Harvest every configured report from every vendor for Q1 2023
//! counterhub harvest --from 2023-01 --to 2023-03
//!
//! # One vendor, two reports, release 5
//! counterhub harvest --from 2023-01 --to 2023-12 --release 5 \
//!     --vendor "Acme Press" --report TR_J1 --report DR
//!
//! # JSON summary
//! counterhub harvest --from 2023-01 --to 2023-03 --format json --pretty
//!
//! # List vendors and report definitions
//! counterhub vendors
//! counterhub reports
//!
//! # Change the request interval
//! counterhub config set-interval 5
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, harvest, reports, vendors};

// ============================================================================
// CLI Definition
// ============================================================================

/// Counterhub CLI - usage-statistics harvesting.
#[derive(Parser)]
#[command(name = "counterhub")]
#[command(about = "Harvest COUNTER usage reports from SUSHI endpoints")]
#[command(long_about = r#"
Counterhub requests usage-statistics reports from every configured vendor,
normalizes releases 5 and 5.1 into one shape, and writes one tab-delimited
file per vendor and report.

Examples:
  counterhub harvest --from 2023-01 --to 2023-03
  counterhub harvest --from 2023-01 --to 2023-03 --vendor "Acme Press"
  counterhub vendors
  counterhub reports
  counterhub config show
"#)]
#[command(version)]
#[command(author = "Counterhub Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Harvest reports for a month range.
    #[command(visible_alias = "h")]
    Harvest(harvest::HarvestArgs),

    /// List configured vendors.
    #[command(visible_alias = "v")]
    Vendors,

    /// List report definitions.
    #[command(visible_alias = "r")]
    Reports,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Every report was written.
    Success = 0,
    /// The command could not run.
    Error = 1,
    /// The harvest ran but some reports failed.
    ReportsFailed = 2,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("counterhub=debug,info")
    } else {
        EnvFilter::new("counterhub=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Harvest(args) => harvest::run(args, &cli).await,
        Commands::Vendors => vendors::run(&cli).await,
        Commands::Reports => reports::run(&cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}
