// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Counterhub` Core
//!
//! Core types, models, and traits for the `Counterhub` harvester.
//!
//! This crate provides the foundational abstractions used across all other
//! `Counterhub` crates, including:
//!
//! - Domain models (vendors, report definitions, canonical reports)
//! - The per-report error taxonomy
//! - Trait definitions for the collaborators the harvester talks to
//!
//! ## Key Types
//!
//! ### Vendor Types
//! - [`Vendor`] - A statistics provider and its per-release connections
//! - [`VendorConnection`] - Endpoint, credentials and request policy
//! - [`ProtocolVersion`] - Legacy (`5`) or current (`5.1`) release
//!
//! ### Report Types
//! - [`ReportDefinition`] - Named template of filters and attributes
//! - [`CanonicalReport`] - Release-independent report model
//! - [`ReportKind`] - Platform, database, title or item report
//! - [`ReportItem`], [`Performance`], [`Instance`] - Report body
//!
//! ### Results
//! - [`FetchResult`] - Outcome of one (vendor, report) call
//! - [`BatchSummary`] - Aggregated counts and run log for a batch

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::{CoreError, HarvestError};

// Re-export all model types
pub use models::{
    // Vendor types
    ProtocolVersion,
    Vendor,
    VendorConnection,
    path_component,
    vendor_dir_name,
    // Definitions
    AttributeValue,
    FilterValue,
    ReportDefinition,
    // Canonical report
    CanonicalReport,
    CurrentHeaderExtras,
    Instance,
    ItemIdentity,
    NameValue,
    Performance,
    Period,
    ReportHeader,
    ReportItem,
    ReportKind,
    // Calendar
    MonthRange,
    YearMonth,
    // Exceptions
    ProtocolException,
    exception_meaning,
    // Results & settings
    BatchSummary,
    FetchResult,
    HarvestSettings,
    SummaryCounts,
};

// Re-export traits
pub use traits::{
    FileWriter, NoProgress, PersistenceLayer, ProgressSink, SettingsProvider, VendorDirectory,
};
