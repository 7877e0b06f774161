//! Domain models for Counterhub.
//!
//! This module contains the core data structures representing vendors,
//! report definitions, the canonical report model, and fetch results.
//!
//! ## Submodules
//!
//! - `vendor` - Vendor types (Vendor, VendorConnection, ProtocolVersion)
//! - `definition` - Report definitions (filters, attributes, catalogue)
//! - `report` - Canonical report model (header, items, performance)
//! - `calendar` - Month arithmetic (YearMonth, MonthRange)
//! - `exception` - Protocol exceptions and the code table
//! - `result` - Fetch results, batch summary, harvest settings

mod calendar;
mod definition;
mod exception;
mod report;
mod result;
mod vendor;

// Re-export everything at the models level
pub use calendar::{MonthRange, YearMonth};
pub use definition::{ALL_SENTINEL, AttributeValue, FilterValue, ReportDefinition};
pub use exception::{ProtocolException, VENDOR_SPECIFIC_MEANING, exception_meaning};
pub use report::{
    CanonicalReport, CurrentHeaderExtras, Instance, ItemIdentity, NameValue, Performance, Period,
    ReportHeader, ReportItem, ReportKind,
};
pub use result::{BatchSummary, FetchResult, HarvestSettings, SummaryCounts};
pub use vendor::{ProtocolVersion, Vendor, VendorConnection, path_component, vendor_dir_name};
