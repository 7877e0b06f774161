//! Vendor directory backed by `vendors.json`.

use async_trait::async_trait;
use counterhub_core::{CoreError, Vendor, VendorDirectory};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::persistence::{default_vendors_path, load_json, save_json};

/// Reads and writes the configured vendors as a JSON array.
///
/// The file is stored owner-only but unencrypted; the password argument of
/// [`VendorDirectory`] is accepted and ignored.
#[derive(Debug, Clone)]
pub struct JsonVendorDirectory {
    path: PathBuf,
}

impl JsonVendorDirectory {
    /// Creates a directory over `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a directory over the default vendors file.
    pub fn load_default() -> Self {
        Self::new(default_vendors_path())
    }

    /// File the vendors are kept in.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl VendorDirectory for JsonVendorDirectory {
    async fn read(&self, _password: Option<&str>) -> Result<Vec<Vendor>, CoreError> {
        match load_json::<Vec<Vendor>>(&self.path).await {
            Ok(vendors) => {
                debug!(count = vendors.len(), "Vendors loaded");
                Ok(vendors)
            }
            Err(e) if e.is_not_found() => {
                debug!(path = %self.path.display(), "No vendors file");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, vendors: &[Vendor], _password: &str) -> bool {
        match save_json(&self.path, &vendors).await {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to save vendors");
                false
            }
        }
    }
}
