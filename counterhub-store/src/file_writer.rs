//! Report file writer.

use async_trait::async_trait;
use counterhub_core::FileWriter;
use std::path::Path;
use tracing::{debug, warn};

/// Writes report files to the local filesystem.
///
/// Parent directories are created as needed. An existing file at the same
/// path is replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileWriter;

impl FsFileWriter {
    /// Creates a writer.
    pub fn new() -> Self {
        Self
    }

    async fn try_write(path: &Path, content: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, content).await
    }
}

#[async_trait]
impl FileWriter for FsFileWriter {
    async fn write(&self, path: &Path, content: &str) -> bool {
        match Self::try_write(path, content).await {
            Ok(()) => {
                debug!(path = %path.display(), bytes = content.len(), "File written");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to write file");
                false
            }
        }
    }
}
