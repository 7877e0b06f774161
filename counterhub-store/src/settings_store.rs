//! User preferences store.
//!
//! Manages user settings with persistence and change notification.

use async_trait::async_trait;
use counterhub_core::{HarvestSettings, ProtocolVersion, SettingsProvider};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_output_dir, default_settings_path, load_json, save_json};

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds between successive requests to a throttled vendor.
    pub request_interval_secs: u64,

    /// Seconds a single request attempt may take.
    pub request_timeout_secs: u64,

    /// Root directory for report files, run logs and the archive.
    pub output_dir: PathBuf,

    /// Log level.
    pub log_level: LogLevel,

    /// Keep a JSON copy of every canonical report.
    pub save_canonical_reports: bool,

    /// Release used when a harvest does not name one.
    pub default_version: ProtocolVersion,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            request_interval_secs: 2,
            request_timeout_secs: 120,
            output_dir: default_output_dir(),
            log_level: LogLevel::default(),
            save_canonical_reports: true,
            default_version: ProtocolVersion::Current,
        }
    }
}

impl Settings {
    /// Request pacing derived from these settings.
    pub fn harvest_settings(&self) -> HarvestSettings {
        HarvestSettings {
            request_interval: Duration::from_secs(self.request_interval_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    Warn,
    /// Info level logging.
    #[default]
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Persistent settings store with change notifications.
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl SettingsStore {
    /// Creates a store holding default settings, saved to `path`.
    pub fn new(path: PathBuf) -> Self {
        Self::with_settings(path, Settings::default())
    }

    fn with_settings(path: PathBuf, settings: Settings) -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be loaded from disk.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path. A missing or unreadable file yields
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be loaded from disk.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        Ok(Self::with_settings(path, settings))
    }

    /// Path the settings are saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings and notifies subscribers.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        {
            let mut settings = self.settings.write().await;
            f(&mut settings);
        }
        self.notify_change().await;
    }

    /// Restores every setting to its default.
    pub async fn reset(&self) {
        self.update(|s| *s = Settings::default()).await;
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    /// Subscribes to settings changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }

    // ========================================================================
    // Convenience Methods
    // ========================================================================

    /// Gets the output directory.
    pub async fn output_dir(&self) -> PathBuf {
        self.settings.read().await.output_dir.clone()
    }

    /// Sets the request interval in seconds.
    pub async fn set_request_interval(&self, secs: u64) {
        self.update(|s| s.request_interval_secs = secs).await;
    }

    /// Sets the request timeout in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] for a zero timeout.
    pub async fn set_request_timeout(&self, secs: u64) -> Result<(), StoreError> {
        if secs == 0 {
            return Err(StoreError::Config("request timeout must be at least 1 second".into()));
        }
        self.update(|s| s.request_timeout_secs = secs).await;
        Ok(())
    }

    /// Sets the output directory.
    pub async fn set_output_dir(&self, dir: PathBuf) {
        self.update(|s| s.output_dir = dir).await;
    }
}

#[async_trait]
impl SettingsProvider for SettingsStore {
    async fn read(&self) -> HarvestSettings {
        self.settings.read().await.harvest_settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.request_interval_secs, 2);
        assert_eq!(settings.request_timeout_secs, 120);
        assert!(settings.save_canonical_reports);
        assert_eq!(settings.default_version, ProtocolVersion::Current);
        assert_eq!(settings.harvest_settings(), HarvestSettings::default());
    }

    #[tokio::test]
    async fn test_update_notifies() {
        let store = SettingsStore::new(PathBuf::from("unused.json"));
        let mut rx = store.subscribe();

        store.set_request_interval(7).await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 1);
        assert_eq!(
            SettingsProvider::read(&store).await.request_interval,
            Duration::from_secs(7)
        );
    }

    #[tokio::test]
    async fn test_zero_timeout_rejected() {
        let store = SettingsStore::new(PathBuf::from("unused.json"));
        assert!(store.set_request_timeout(0).await.is_err());
        assert_eq!(store.get().await.request_timeout_secs, 120);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"request_interval_secs": 9}"#).unwrap();
        assert_eq!(settings.request_interval_secs, 9);
        assert_eq!(settings.request_timeout_secs, 120);
    }
}
