//! Report definitions backed by `reports.json`.

use counterhub_core::ReportDefinition;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StoreError;
use crate::persistence::{default_definitions_path, load_json, save_json};

/// Stored report definitions.
///
/// Without a definitions file the standard catalogue is used.
#[derive(Debug, Clone)]
pub struct DefinitionStore {
    path: PathBuf,
}

impl DefinitionStore {
    /// Creates a store over `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store over the default definitions file.
    pub fn load_default() -> Self {
        Self::new(default_definitions_path())
    }

    /// File the definitions are kept in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every definition.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be parsed.
    pub async fn read(&self) -> Result<Vec<ReportDefinition>, StoreError> {
        match load_json(&self.path).await {
            Ok(definitions) => Ok(definitions),
            Err(e) if e.is_not_found() => {
                debug!(path = %self.path.display(), "No definitions file, using standard catalogue");
                Ok(ReportDefinition::standard_catalogue())
            }
            Err(e) => Err(e),
        }
    }

    /// Replaces the stored definitions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be written.
    pub async fn write(&self, definitions: &[ReportDefinition]) -> Result<(), StoreError> {
        save_json(&self.path, &definitions).await
    }

    /// Definitions whose id matches one of `ids` (case-insensitive), or all
    /// definitions when `ids` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the definitions cannot be read.
    pub async fn select(&self, ids: &[String]) -> Result<Vec<ReportDefinition>, StoreError> {
        let definitions = self.read().await?;
        if ids.is_empty() {
            return Ok(definitions);
        }
        let wanted: Vec<String> = ids.iter().map(|id| id.trim().to_uppercase()).collect();
        Ok(definitions
            .into_iter()
            .filter(|d| wanted.contains(&d.normalized_id()))
            .collect())
    }
}
