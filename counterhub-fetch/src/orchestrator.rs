//! Batch orchestration.
//!
//! A batch is every selected report for every selected vendor over one
//! month range. Vendors run concurrently. Within a vendor, reports run
//! concurrently unless the vendor requires throttling, in which case they
//! run one after another with the request interval between them. The batch
//! always waits for every vendor; one failure never stops another report.
//!
//! Everything runs on the caller's task. Concurrency is interleaved I/O
//! through `join_all`, not parallel threads.

use chrono::Utc;
use counterhub_core::{
    BatchSummary, FetchResult, FileWriter, HarvestError, HarvestSettings, MonthRange, NoProgress,
    PersistenceLayer, ProgressSink, ProtocolVersion, ReportDefinition, SettingsProvider, Vendor,
    VendorConnection,
};
use counterhub_reports::{FilenameComposer, ReportNormalizer, ReportSerializer};
use futures::future::join_all;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::client::ReportClient;

// ============================================================================
// Request & Outcome
// ============================================================================

/// What to harvest.
#[derive(Debug, Clone)]
pub struct HarvestRequest {
    /// Report definitions to request from every vendor.
    pub definitions: Vec<ReportDefinition>,
    /// Vendors to harvest.
    pub vendors: Vec<Vendor>,
    /// Wire release to use.
    pub version: ProtocolVersion,
    /// Months to request.
    pub range: MonthRange,
}

/// What a batch produced.
#[derive(Debug, Clone)]
pub struct HarvestOutcome {
    /// One result per attempted (vendor, report) pair.
    pub results: Vec<FetchResult>,
    /// Aggregated counts and the run log.
    pub summary: BatchSummary,
}

// ============================================================================
// Run Log
// ============================================================================

/// Timestamped lines for the run log file.
#[derive(Debug, Default)]
struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    fn push(&mut self, vendor: &str, message: impl Display) {
        self.lines.push(format!(
            "{} [{vendor}] {message}",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        ));
    }

    fn extend(&mut self, other: RunLog) {
        self.lines.extend(other.lines);
    }
}

struct VendorOutcome {
    results: Vec<FetchResult>,
    log: RunLog,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Runs harvest batches.
pub struct FetchOrchestrator {
    client: ReportClient,
    settings: Arc<dyn SettingsProvider>,
    writer: Arc<dyn FileWriter>,
    persistence: Option<Arc<dyn PersistenceLayer>>,
    progress: Arc<dyn ProgressSink>,
    output_root: PathBuf,
}

impl std::fmt::Debug for FetchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOrchestrator")
            .field("output_root", &self.output_root)
            .field("persistence", &self.persistence.is_some())
            .finish_non_exhaustive()
    }
}

impl FetchOrchestrator {
    /// Starts building an orchestrator that writes through `writer`.
    pub fn builder(client: ReportClient, writer: Arc<dyn FileWriter>) -> FetchOrchestratorBuilder {
        FetchOrchestratorBuilder::new(client, writer)
    }

    /// Runs one batch.
    ///
    /// Vendor completion is signalled once per vendor, whatever happened to
    /// its reports. Once `cancel` fires, reports not yet requested are
    /// recorded as cancelled.
    #[instrument(skip_all, fields(vendors = request.vendors.len(), reports = request.definitions.len()))]
    pub async fn run(&self, request: &HarvestRequest, cancel: &CancellationToken) -> HarvestOutcome {
        let settings = self.settings.read().await;
        info!(
            version = %request.version,
            begin = %request.range.begin,
            end = %request.range.end,
            interval_secs = settings.request_interval.as_secs(),
            timeout_secs = settings.request_timeout.as_secs(),
            "Starting harvest"
        );

        let vendor_tasks = request
            .vendors
            .iter()
            .map(|vendor| self.harvest_vendor(vendor, request, &settings, cancel));
        let outcomes = join_all(vendor_tasks).await;

        let vendors_completed = outcomes.len();
        let mut results = Vec::new();
        let mut log = RunLog::default();
        for outcome in outcomes {
            results.extend(outcome.results);
            log.extend(outcome.log);
        }

        let summary = BatchSummary::from_results(&results, vendors_completed, log.lines);
        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "Harvest finished"
        );

        HarvestOutcome { results, summary }
    }

    async fn harvest_vendor(
        &self,
        vendor: &Vendor,
        request: &HarvestRequest,
        settings: &HarvestSettings,
        cancel: &CancellationToken,
    ) -> VendorOutcome {
        let mut log = RunLog::default();
        let results = self
            .vendor_results(vendor, request, settings, cancel, &mut log)
            .await;

        let failed = results.iter().filter(|r| !r.success).count();
        log.push(
            &vendor.name,
            format!(
                "Vendor completed: {} succeeded, {failed} failed",
                results.len() - failed
            ),
        );
        self.progress.vendor_completed();

        VendorOutcome { results, log }
    }

    async fn vendor_results(
        &self,
        vendor: &Vendor,
        request: &HarvestRequest,
        settings: &HarvestSettings,
        cancel: &CancellationToken,
        log: &mut RunLog,
    ) -> Vec<FetchResult> {
        let Some(connection) = vendor.connection(request.version) else {
            log.push(
                &vendor.name,
                HarvestError::NotConnected {
                    release: request.version.to_string(),
                },
            );
            return Vec::new();
        };

        if cancel.is_cancelled() {
            log.push(&vendor.name, "Cancelled before discovery");
            return request
                .definitions
                .iter()
                .map(|d| cancelled(vendor, d))
                .collect();
        }

        let Some(available) = self.client.discover(connection, settings).await else {
            warn!(vendor = %vendor.name, "Report discovery failed");
            log.push(&vendor.name, HarvestError::DiscoveryFailed);
            return Vec::new();
        };
        log.push(
            &vendor.name,
            format!("Vendor offers: {}", available.join(", ")),
        );

        let mut selected = Vec::new();
        for definition in &request.definitions {
            if available.contains(&definition.normalized_id()) {
                selected.push(definition);
            } else {
                log.push(
                    &vendor.name,
                    format!("{}: not offered by vendor, skipped", definition.normalized_id()),
                );
            }
        }

        if connection.require_requests_throttled {
            debug!(vendor = %vendor.name, reports = selected.len(), "Throttled vendor");
            let mut results = Vec::with_capacity(selected.len());
            for (index, definition) in selected.into_iter().enumerate() {
                if index > 0 {
                    tokio::select! {
                        () = tokio::time::sleep(settings.request_interval) => {}
                        () = cancel.cancelled() => {}
                    }
                }
                let (result, report_log) = self
                    .guarded_report(vendor, connection, definition, request, settings, cancel)
                    .await;
                log.extend(report_log);
                results.push(result);
            }
            results
        } else {
            let tasks = selected.into_iter().map(|definition| {
                self.guarded_report(vendor, connection, definition, request, settings, cancel)
            });
            join_all(tasks)
                .await
                .into_iter()
                .map(|(result, report_log)| {
                    log.extend(report_log);
                    result
                })
                .collect()
        }
    }

    async fn guarded_report(
        &self,
        vendor: &Vendor,
        connection: &VendorConnection,
        definition: &ReportDefinition,
        request: &HarvestRequest,
        settings: &HarvestSettings,
        cancel: &CancellationToken,
    ) -> (FetchResult, RunLog) {
        if cancel.is_cancelled() {
            let mut log = RunLog::default();
            log.push(
                &vendor.name,
                format!("{}: {}", definition.normalized_id(), HarvestError::Cancelled),
            );
            return (cancelled(vendor, definition), log);
        }
        self.harvest_report(vendor, connection, definition, request, settings)
            .await
    }

    #[instrument(skip_all, fields(vendor = %vendor.name, report = %definition.id))]
    async fn harvest_report(
        &self,
        vendor: &Vendor,
        connection: &VendorConnection,
        definition: &ReportDefinition,
        request: &HarvestRequest,
        settings: &HarvestSettings,
    ) -> (FetchResult, RunLog) {
        let mut log = RunLog::default();
        let report_id = definition.normalized_id();
        let mut result = FetchResult::new(&report_id, &vendor.name, definition.is_custom());

        let payload = match self
            .client
            .fetch(connection, definition, request.version, request.range, settings)
            .await
        {
            Ok(payload) => payload,
            Err(error) => {
                if request.version == ProtocolVersion::Legacy
                    && connection.require_ip_checking
                    && is_authorization_failure(&error)
                {
                    result.warn(format!(
                        "{} authenticates by IP address; check that this host's address is registered",
                        vendor.name
                    ));
                }
                return fail(result, error, &vendor.name, log);
            }
        };

        let report = match ReportNormalizer::for_report(request.version, &report_id).normalize(&payload) {
            Ok(report) => report,
            Err(e) => return fail(result, e.into(), &vendor.name, log),
        };

        for exception in &report.header.exceptions {
            result.warn(exception.to_string());
        }
        for entry in &report.header.unparsed_exceptions {
            result.warn(format!("Unreadable header exception: {entry}"));
        }

        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save(&report, &vendor.name).await {
                warn!(error = %e, "Failed to archive canonical report");
                result.warn(format!("Canonical report not archived: {e}"));
            }
        }

        let tsv = match ReportSerializer::with_range(request.range).serialize(&report) {
            Ok(tsv) => tsv,
            Err(e) => return fail(result, e.into(), &vendor.name, log),
        };

        let path = self.output_root.join(FilenameComposer::compose(
            &vendor.name,
            definition,
            request.version,
            request.range,
        ));
        if !self.writer.write(&path, &tsv).await {
            let error = HarvestError::WriteFailed {
                path: path.display().to_string(),
            };
            return fail(result, error, &vendor.name, log);
        }

        for warning in &result.warnings {
            log.push(&vendor.name, format!("{report_id}: warning: {warning}"));
        }
        log.push(&vendor.name, format!("{report_id}: wrote {}", path.display()));
        info!(path = %path.display(), items = report.items.len(), "Report written");

        (result.succeeded(path.display().to_string()), log)
    }
}

fn fail(
    result: FetchResult,
    error: HarvestError,
    vendor: &str,
    mut log: RunLog,
) -> (FetchResult, RunLog) {
    warn!(report = %result.report_id, error = %error, "Report failed");
    for warning in &result.warnings {
        log.push(vendor, format!("{}: warning: {warning}", result.report_id));
    }
    log.push(vendor, format!("{}: failed: {error}", result.report_id));
    (result.failed(error), log)
}

fn cancelled(vendor: &Vendor, definition: &ReportDefinition) -> FetchResult {
    FetchResult::new(definition.normalized_id(), &vendor.name, definition.is_custom())
        .failed(HarvestError::Cancelled)
}

fn is_authorization_failure(error: &HarvestError) -> bool {
    matches!(error, HarvestError::Http { status: 401 | 403, .. })
        || matches!(error.code(), Some(2000 | 2010 | 2030))
}

// ============================================================================
// Builder
// ============================================================================

/// Settings used when no provider is configured.
struct DefaultSettings;

#[async_trait::async_trait]
impl SettingsProvider for DefaultSettings {
    async fn read(&self) -> HarvestSettings {
        HarvestSettings::default()
    }
}

/// Builder for [`FetchOrchestrator`].
pub struct FetchOrchestratorBuilder {
    client: ReportClient,
    writer: Arc<dyn FileWriter>,
    settings: Option<Arc<dyn SettingsProvider>>,
    persistence: Option<Arc<dyn PersistenceLayer>>,
    progress: Option<Arc<dyn ProgressSink>>,
    output_root: PathBuf,
}

impl FetchOrchestratorBuilder {
    fn new(client: ReportClient, writer: Arc<dyn FileWriter>) -> Self {
        Self {
            client,
            writer,
            settings: None,
            persistence: None,
            progress: None,
            output_root: PathBuf::from("."),
        }
    }

    /// Sets the settings source. Defaults to 2s interval and 120s timeout.
    #[must_use]
    pub fn settings(mut self, settings: Arc<dyn SettingsProvider>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Archives canonical reports through `persistence`.
    #[must_use]
    pub fn persistence(mut self, persistence: Arc<dyn PersistenceLayer>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Receives vendor-completed signals.
    #[must_use]
    pub fn progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Directory report paths are resolved against.
    #[must_use]
    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Builds the orchestrator.
    pub fn build(self) -> FetchOrchestrator {
        FetchOrchestrator {
            client: self.client,
            settings: self.settings.unwrap_or_else(|| Arc::new(DefaultSettings)),
            writer: self.writer,
            persistence: self.persistence,
            progress: self.progress.unwrap_or_else(|| Arc::new(NoProgress)),
            output_root: self.output_root,
        }
    }
}
