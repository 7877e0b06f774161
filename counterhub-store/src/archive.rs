//! Canonical report archive.

use async_trait::async_trait;
use chrono::Utc;
use counterhub_core::{
    CanonicalReport, CoreError, PersistenceLayer, path_component, vendor_dir_name,
};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::persistence::save_json;

/// Directory under the output root that holds archived reports.
pub const ARCHIVE_DIR: &str = ".archive";

/// Keeps every canonical report as pretty JSON.
///
/// Files land at `{root}/.archive/{vendor-dir}/{report}_{release}_{timestamp}.json`.
#[derive(Debug, Clone)]
pub struct JsonReportArchive {
    root: PathBuf,
}

impl JsonReportArchive {
    /// Creates an archive under `output_root`.
    pub fn new(output_root: impl AsRef<Path>) -> Self {
        Self {
            root: output_root.as_ref().join(ARCHIVE_DIR),
        }
    }

    /// Directory archived reports are written under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for one report archived now.
    pub fn path_for(&self, report: &CanonicalReport, vendor_name: &str) -> PathBuf {
        let report_id = if report.header.report_id.trim().is_empty() {
            report.kind.to_string()
        } else {
            path_component(&report.header.report_id.to_uppercase())
        };
        self.root.join(vendor_dir_name(vendor_name)).join(format!(
            "{report_id}_{}_{}.json",
            report.version.file_token(),
            Utc::now().format("%Y%m%d_%H%M%S%3f")
        ))
    }
}

#[async_trait]
impl PersistenceLayer for JsonReportArchive {
    async fn save(&self, report: &CanonicalReport, vendor_name: &str) -> Result<(), CoreError> {
        let path = self.path_for(report, vendor_name);
        save_json(&path, report).await?;
        debug!(path = %path.display(), "Canonical report archived");
        Ok(())
    }
}
