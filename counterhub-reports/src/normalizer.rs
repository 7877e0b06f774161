//! Release-independent normalization entry point.

use counterhub_core::{CanonicalReport, ProtocolVersion, ReportKind};
use serde_json::Value;

use crate::current::parse_current_report;
use crate::error::ReportError;
use crate::legacy::parse_legacy_report;

/// Converts a validated payload into a [`CanonicalReport`].
///
/// A normalizer is built for one release and one report kind; the kind is
/// resolved once from the report id and carried on the resulting report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportNormalizer {
    version: ProtocolVersion,
    kind: ReportKind,
}

impl ReportNormalizer {
    /// Creates a normalizer for `version` and `kind`.
    pub fn new(version: ProtocolVersion, kind: ReportKind) -> Self {
        Self { version, kind }
    }

    /// Creates a normalizer, resolving the kind from `report_id`.
    pub fn for_report(version: ProtocolVersion, report_id: &str) -> Self {
        Self::new(version, ReportKind::from_report_id(report_id))
    }

    /// The release this normalizer parses.
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// The report kind this normalizer produces.
    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Normalizes `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Normalization`] if the payload is not an object
    /// or any nested member has an unexpected shape.
    pub fn normalize(&self, payload: &Value) -> Result<CanonicalReport, ReportError> {
        if !payload.is_object() {
            return Err(ReportError::Normalization(format!(
                "expected a report object, got {}",
                value_type(payload)
            )));
        }
        match self.version {
            ProtocolVersion::Legacy => parse_legacy_report(payload, self.kind),
            ProtocolVersion::Current => parse_current_report(payload, self.kind),
        }
    }
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
