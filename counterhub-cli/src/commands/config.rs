//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use counterhub_store::{
    SettingsStore, default_config_dir, default_definitions_path, default_settings_path,
    default_vendors_path,
};
use std::path::PathBuf;
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set seconds between requests to a throttled vendor.
    SetInterval {
        /// Interval in seconds.
        seconds: u64,
    },

    /// Set seconds a single request may take.
    SetTimeout {
        /// Timeout in seconds.
        seconds: u64,
    },

    /// Set the report output directory.
    SetOutput {
        /// Directory path.
        dir: PathBuf,
    },

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::SetInterval { seconds } => {
            let store = SettingsStore::load_default().await?;
            store.set_request_interval(*seconds).await;
            store.save().await?;
            info!(seconds, "Request interval updated");
            println!("Request interval set to {seconds}s");
            Ok(())
        }
        ConfigAction::SetTimeout { seconds } => {
            let store = SettingsStore::load_default().await?;
            store.set_request_timeout(*seconds).await?;
            store.save().await?;
            info!(seconds, "Request timeout updated");
            println!("Request timeout set to {seconds}s");
            Ok(())
        }
        ConfigAction::SetOutput { dir } => {
            let store = SettingsStore::load_default().await?;
            store.set_output_dir(dir.clone()).await;
            store.save().await?;
            info!(dir = %dir.display(), "Output directory updated");
            println!("Output directory set to {}", dir.display());
            Ok(())
        }
        ConfigAction::Reset => reset_config().await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => {
            println!("Counterhub Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Request interval:  {}s", settings.request_interval_secs);
            println!("Request timeout:   {}s", settings.request_timeout_secs);
            println!("Output directory:  {}", settings.output_dir.display());
            println!("Default release:   {}", settings.default_version);
            println!("Archive reports:   {}", settings.save_canonical_reports);
            println!("Log level:         {}", settings.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = default_settings_path();
    let vendors_path = default_vendors_path();
    let definitions_path = default_definitions_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:       {}", config_dir.display());
            println!("Settings file:    {}", settings_path.display());
            println!("Vendors file:     {}", vendors_path.display());
            println!("Definitions file: {}", definitions_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
                "vendors_file": vendors_path.display().to_string(),
                "definitions_file": definitions_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn reset_config() -> Result<()> {
    let path = default_settings_path();

    if path.exists() {
        tokio::fs::remove_file(&path).await?;
        info!(path = %path.display(), "Settings reset");
        println!("Configuration reset to defaults");
    } else {
        println!("No configuration file to reset");
    }

    Ok(())
}
