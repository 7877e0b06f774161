//! Protocol exceptions.
//!
//! Vendors report problems by embedding an exception object in an otherwise
//! well-formed JSON payload. Codes are fixed by the protocol; the meaning
//! table below is the lookup used for the run log and warnings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Meaning reported for codes the table does not list (1-999 are reserved
/// for vendor-specific use).
pub const VENDOR_SPECIFIC_MEANING: &str = "Vendor-specific exception";

const EXCEPTION_MEANINGS: &[(i64, &str)] = &[
    (-1, "Request timed out"),
    (0, "Info or Debug"),
    (1000, "Service Not Available"),
    (1010, "Service Busy"),
    (1011, "Report Queued for Processing"),
    (1020, "Client has made too many requests"),
    (1030, "Insufficient Information to Process Request"),
    (2000, "Requestor Not Authorized to Access Service"),
    (2010, "Requestor is Not Authorized to Access Usage for Institution"),
    (2011, "Global Reports Not Supported"),
    (2020, "APIKey Invalid"),
    (2030, "IP Address Not Authorized to Access Service"),
    (3000, "Report Not Supported"),
    (3010, "Report Version Not Supported"),
    (3020, "Invalid Date Arguments"),
    (3030, "No Usage Available for Requested Dates"),
    (3031, "Usage Not Ready for Requested Dates"),
    (3032, "Usage No Longer Available for Requested Dates"),
    (3040, "Partial Data Returned"),
    (3050, "Parameter Not Recognized in this Context"),
    (3060, "Invalid ReportFilter Value"),
    (3061, "Incongruous ReportFilter Value"),
    (3062, "Invalid ReportAttribute Value"),
    (3063, "Components Not Supported"),
    (3070, "Required ReportFilter Missing"),
    (3071, "Required ReportAttribute Missing"),
    (3080, "Limit Requested Greater than Maximum Server Limit"),
];

/// Looks up the documented meaning of an exception code.
pub fn exception_meaning(code: i64) -> &'static str {
    EXCEPTION_MEANINGS
        .iter()
        .find(|(c, _)| *c == code)
        .map_or(VENDOR_SPECIFIC_MEANING, |(_, meaning)| meaning)
}

/// A vendor-embedded exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolException {
    /// Numeric exception code.
    pub code: i64,
    /// Vendor-supplied message.
    pub message: String,
    /// Severity, when the vendor sends one (dropped in the current release).
    pub severity: Option<String>,
    /// Documented meaning of `code`.
    pub meaning: String,
    /// Optional vendor detail.
    pub data: Option<String>,
}

impl ProtocolException {
    /// Creates an exception, looking up the meaning of `code`.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity: None,
            meaning: exception_meaning(code).to_string(),
            data: None,
        }
    }

    /// Sets the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Option<String>) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the vendor detail.
    #[must_use]
    pub fn with_data(mut self, data: Option<String>) -> Self {
        self.data = data;
        self
    }
}

impl fmt::Display for ProtocolException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exception {} ({})", self.code, self.meaning)?;
        if let Some(severity) = &self.severity {
            write!(f, " [{severity}]")?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(data) = &self.data {
            write!(f, " ({data})")?;
        }
        Ok(())
    }
}
