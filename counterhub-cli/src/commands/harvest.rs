//! Harvest command - run one batch and write the run log.

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Args;
use counterhub_core::{
    CoreError, FileWriter, MonthRange, ProgressSink, ProtocolVersion, Vendor, VendorDirectory,
    YearMonth,
};
use counterhub_fetch::{
    CancellationToken, FetchOrchestrator, HarvestOutcome, HarvestRequest, HttpClient, ReportClient,
};
use counterhub_store::{
    DefinitionStore, FsFileWriter, JsonReportArchive, JsonVendorDirectory, SettingsStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the harvest command.
#[derive(Args)]
pub struct HarvestArgs {
    /// First month to request (YYYY-MM).
    #[arg(long)]
    pub from: YearMonth,

    /// Last month to request (YYYY-MM).
    #[arg(long)]
    pub to: YearMonth,

    /// Release to use (5 or 5.1). Defaults to the configured release.
    #[arg(long)]
    pub release: Option<ProtocolVersion>,

    /// Vendor to harvest, by name. Repeat for several; all when omitted.
    #[arg(long = "vendor")]
    pub vendors: Vec<String>,

    /// Report id to request. Repeat for several; all when omitted.
    #[arg(long = "report")]
    pub reports: Vec<String>,

    /// Output directory. Defaults to the configured directory.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Prints vendor completion to stderr.
struct StderrProgress {
    total: usize,
    done: AtomicUsize,
    quiet: bool,
}

impl ProgressSink for StderrProgress {
    fn vendor_completed(&self) {
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.quiet {
            eprintln!("[{done}/{}] vendors completed", self.total);
        }
    }
}

/// Runs the harvest command.
pub async fn run(args: &HarvestArgs, cli: &Cli) -> Result<()> {
    let range = MonthRange::new(args.from, args.to)?;

    let settings = Arc::new(SettingsStore::load_default().await?);
    let current = settings.get().await;
    let version = args.release.unwrap_or(current.default_version);
    let output_root = args.output.clone().unwrap_or(current.output_dir);

    let vendors = select_vendors(
        JsonVendorDirectory::load_default().read(None).await?,
        &args.vendors,
    )?;
    let definitions = DefinitionStore::load_default().select(&args.reports).await?;
    if vendors.is_empty() {
        bail!("No vendors configured. Add vendors to the vendors file first");
    }
    if definitions.is_empty() {
        bail!("No matching report definitions");
    }

    info!(
        vendors = vendors.len(),
        reports = definitions.len(),
        version = %version,
        output = %output_root.display(),
        "Harvest requested"
    );

    let client = ReportClient::new(HttpClient::new()?);
    let writer: Arc<dyn FileWriter> = Arc::new(FsFileWriter::new());
    let progress = Arc::new(StderrProgress {
        total: vendors.len(),
        done: AtomicUsize::new(0),
        quiet: cli.quiet || cli.format == OutputFormat::Json,
    });

    let mut builder = FetchOrchestrator::builder(client, writer.clone())
        .settings(settings)
        .progress(progress)
        .output_root(&output_root);
    if current.save_canonical_reports {
        builder = builder.persistence(Arc::new(JsonReportArchive::new(&output_root)));
    }
    let orchestrator = builder.build();

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling remaining reports");
                cancel.cancel();
            }
        }
    });

    let request = HarvestRequest {
        definitions,
        vendors,
        version,
        range,
    };
    let outcome = orchestrator.run(&request, &cancel).await;
    ctrl_c.abort();

    let log_path = write_run_log(writer.as_ref(), &output_root, &outcome).await;

    output_outcome(&outcome, log_path.as_deref(), cli)?;

    if outcome.summary.failed() > 0 {
        std::process::exit(ExitCode::ReportsFailed as i32);
    }
    Ok(())
}

/// Keeps vendors named in `names` (case-insensitive), or all when empty.
pub fn select_vendors(vendors: Vec<Vendor>, names: &[String]) -> Result<Vec<Vendor>> {
    if names.is_empty() {
        return Ok(vendors);
    }
    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        let Some(vendor) = vendors
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name.trim()) || v.id == name.trim())
        else {
            return Err(CoreError::VendorNotFound(name.clone()).into());
        };
        if !selected.contains(vendor) {
            selected.push(vendor.clone());
        }
    }
    Ok(selected)
}

/// Path of the run log for a batch started now.
pub fn run_log_path(output_root: &Path) -> PathBuf {
    output_root.join("logs").join(format!(
        "harvest_{}.log",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

async fn write_run_log(
    writer: &dyn FileWriter,
    output_root: &Path,
    outcome: &HarvestOutcome,
) -> Option<PathBuf> {
    let path = run_log_path(output_root);
    let mut content = outcome.summary.log.clone();
    content.push('\n');
    if writer.write(&path, &content).await {
        debug!(path = %path.display(), "Run log written");
        Some(path)
    } else {
        warn!(path = %path.display(), "Failed to write run log");
        None
    }
}

fn output_outcome(outcome: &HarvestOutcome, log_path: Option<&Path>, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            if cli.quiet {
                return Ok(());
            }
            let formatter = TextFormatter::new(!cli.no_color);
            for result in &outcome.results {
                println!("{}", formatter.format_result_line(result));
            }
            if !outcome.results.is_empty() {
                println!();
            }
            println!("{}", formatter.format_summary(&outcome.summary, log_path));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = formatter
                .format_harvest(outcome, log_path)
                .context("Failed to render harvest summary")?;
            println!("{output}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vendors() -> Vec<Vendor> {
        vec![Vendor::new("acme", "Acme Press"), Vendor::new("beta", "Beta")]
    }

    #[test]
    fn test_select_all_when_unnamed() {
        assert_eq!(select_vendors(vendors(), &[]).unwrap().len(), 2);
    }

    #[test]
    fn test_select_by_name_or_id() {
        let picked = select_vendors(vendors(), &["acme press".into(), "beta".into()]).unwrap();
        let names: Vec<_> = picked.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["Acme Press", "Beta"]);
    }

    #[test]
    fn test_unknown_vendor() {
        let err = select_vendors(vendors(), &["Gamma".into()]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::VendorNotFound(name)) if name == "Gamma"
        ));
        assert_eq!(err.to_string(), "Vendor not found: Gamma");
    }

    #[test]
    fn test_run_log_path() {
        let path = run_log_path(Path::new("/out"));
        assert!(path.starts_with("/out/logs"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("harvest_") && name.ends_with(".log"));
        assert_eq!(name.len(), "harvest_20230101_000000.log".len());
    }
}
