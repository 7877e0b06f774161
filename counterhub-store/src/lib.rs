// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Counterhub Store
//!
//! File-backed state for Counterhub.
//!
//! This crate provides:
//!
//! - **SettingsStore**: User preferences with persistence and change notification
//! - **JsonVendorDirectory**: Configured vendors in `vendors.json`
//! - **DefinitionStore**: Report definitions, falling back to the standard catalogue
//! - **FsFileWriter**: Writes report files, creating directories as needed
//! - **JsonReportArchive**: Keeps canonical reports as JSON next to the output
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use counterhub_store::{JsonVendorDirectory, SettingsStore};
//! use counterhub_core::VendorDirectory;
//!
//! let settings = SettingsStore::load_default().await?;
//! let vendors = JsonVendorDirectory::load_default().read(None).await?;
//!
//! settings.update(|s| s.request_interval_secs = 5).await;
//! settings.save().await?;
//! ```

pub mod archive;
pub mod definition_store;
pub mod error;
pub mod file_writer;
pub mod persistence;
pub mod settings_store;
pub mod vendor_store;

pub use archive::JsonReportArchive;
pub use definition_store::DefinitionStore;
pub use error::StoreError;
pub use file_writer::FsFileWriter;
pub use persistence::{
    default_config_dir, default_definitions_path, default_output_dir, default_settings_path,
    default_vendors_path, ensure_dir, load_json, load_json_or_default, save_json,
};
pub use settings_store::{LogLevel, Settings, SettingsStore};
pub use vendor_store::JsonVendorDirectory;
