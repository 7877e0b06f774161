//! Collaborator traits for Counterhub.
//!
//! The harvester core talks to storage, settings and progress reporting only
//! through these traits. `counterhub-store` provides file-backed
//! implementations; tests provide in-memory ones.

use async_trait::async_trait;
use std::path::Path;

use crate::error::CoreError;
use crate::models::{CanonicalReport, HarvestSettings, Vendor};

/// Source of configured vendors.
#[async_trait]
pub trait VendorDirectory: Send + Sync {
    /// Reads all vendors, unlocking with `password` when the store needs one.
    async fn read(&self, password: Option<&str>) -> Result<Vec<Vendor>, CoreError>;

    /// Replaces the stored vendors. Returns false when nothing was written.
    async fn write(&self, vendors: &[Vendor], password: &str) -> bool;
}

/// Best-effort archive of canonical reports.
///
/// A failed save is logged by the caller and never blocks TSV output.
#[async_trait]
pub trait PersistenceLayer: Send + Sync {
    /// Stores one canonical report.
    async fn save(&self, report: &CanonicalReport, vendor_name: &str) -> Result<(), CoreError>;
}

/// Writes output files, creating parent directories as needed.
#[async_trait]
pub trait FileWriter: Send + Sync {
    /// Writes `content` to `path`. Returns false on failure.
    async fn write(&self, path: &Path, content: &str) -> bool;
}

/// Source of the request pacing settings.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Current settings.
    async fn read(&self) -> HarvestSettings;
}

/// Receives progress signals from a running batch.
pub trait ProgressSink: Send + Sync {
    /// Called exactly once per vendor, whatever the outcome.
    fn vendor_completed(&self);
}

/// A sink that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn vendor_completed(&self) {}
}
