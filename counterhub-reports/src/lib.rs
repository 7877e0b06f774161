// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `Counterhub` Reports
//!
//! Turns validated vendor payloads into tab-delimited report files.
//!
//! Each wire release has its own parser module. Both produce the same
//! [`CanonicalReport`](counterhub_core::CanonicalReport), which the
//! serializer then lays out as a TSV document.
//!
//! ## Pipeline
//!
//! | Stage | Type | Input | Output |
//! |-------|------|-------|--------|
//! | Normalize | [`ReportNormalizer`] | `serde_json::Value` | `CanonicalReport` |
//! | Serialize | [`ReportSerializer`] | `CanonicalReport` | TSV text |
//! | Name | [`FilenameComposer`] | vendor, definition, range | relative path |
//!
//! ## Supported Releases
//!
//! | Release | Module | Body shape |
//! |---------|--------|------------|
//! | 5 | [`legacy`] | item / performance / instance |
//! | 5.1 | [`current`] | attribute-performance month maps |
//!
//! ## Usage
//!
//! ```ignore
//! use counterhub_core::{ProtocolVersion, ReportKind};
//! use counterhub_reports::{ReportNormalizer, ReportSerializer};
//!
//! let normalizer = ReportNormalizer::new(ProtocolVersion::Current, ReportKind::Title);
//! let report = normalizer.normalize(&payload)?;
//! let tsv = ReportSerializer::new().serialize(&report)?;
//! ```

pub mod current;
pub mod error;
pub mod filename;
pub mod legacy;
pub mod normalizer;
pub mod serializer;

mod shared;


pub use error::ReportError;
pub use filename::FilenameComposer;
pub use normalizer::ReportNormalizer;
pub use serializer::ReportSerializer;
