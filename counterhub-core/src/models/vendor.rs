//! Vendor types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Protocol Version
// ============================================================================

/// Wire-format release of the statistics-exchange protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ProtocolVersion {
    /// Release 5: flat item/performance/instance payloads.
    #[serde(rename = "5")]
    Legacy,
    /// Release 5.1: attribute-performance month maps.
    #[default]
    #[serde(rename = "5.1")]
    Current,
}

impl ProtocolVersion {
    /// Release string sent and reported by vendors.
    pub fn release(&self) -> &'static str {
        match self {
            Self::Legacy => "5",
            Self::Current => "5.1",
        }
    }

    /// Release string with `.` replaced for use in file names.
    pub fn file_token(&self) -> String {
        self.release().replace('.', "_")
    }

    /// All supported versions.
    pub fn all() -> &'static [ProtocolVersion] {
        &[Self::Legacy, Self::Current]
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.release())
    }
}

impl FromStr for ProtocolVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "5" | "5.0" | "legacy" => Ok(Self::Legacy),
            "5.1" | "current" => Ok(Self::Current),
            other => Err(CoreError::InvalidConfig(format!(
                "unknown release {other:?}; expected 5 or 5.1"
            ))),
        }
    }
}

// ============================================================================
// Vendor
// ============================================================================

/// Connection details and request policy for one protocol release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorConnection {
    /// Endpoint base URL (without trailing `/reports`).
    pub base_url: String,
    /// Customer identifier.
    pub customer_id: String,
    /// Requestor identifier.
    #[serde(default)]
    pub requestor_id: String,
    /// Optional API key.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Issue every report request twice.
    #[serde(default)]
    pub require_two_attempts_per_report: bool,
    /// Issue this vendor's report requests one at a time with spacing.
    #[serde(default)]
    pub require_requests_throttled: bool,
    /// Vendor authenticates by IP address (legacy release only).
    #[serde(default)]
    pub require_ip_checking: bool,
}

impl VendorConnection {
    /// Creates a connection with the default request policy.
    pub fn new(base_url: impl Into<String>, customer_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            customer_id: customer_id.into(),
            requestor_id: String::new(),
            api_key: None,
            require_two_attempts_per_report: false,
            require_requests_throttled: false,
            require_ip_checking: false,
        }
    }

    /// Number of attempts per report call.
    pub fn attempts_per_report(&self) -> u32 {
        if self.require_two_attempts_per_report { 2 } else { 1 }
    }
}

/// A statistics provider with per-release connection blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    /// Stable identifier.
    pub id: String,
    /// Display name, also used in output paths.
    pub name: String,
    /// Release 5 connection.
    #[serde(default)]
    pub legacy: Option<VendorConnection>,
    /// Release 5.1 connection.
    #[serde(default)]
    pub current: Option<VendorConnection>,
}

impl Vendor {
    /// Creates a vendor without connections.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            legacy: None,
            current: None,
        }
    }

    /// Sets the connection for `version`.
    #[must_use]
    pub fn with_connection(mut self, version: ProtocolVersion, connection: VendorConnection) -> Self {
        match version {
            ProtocolVersion::Legacy => self.legacy = Some(connection),
            ProtocolVersion::Current => self.current = Some(connection),
        }
        self
    }

    /// Connection block for `version`, if configured.
    pub fn connection(&self, version: ProtocolVersion) -> Option<&VendorConnection> {
        match version {
            ProtocolVersion::Legacy => self.legacy.as_ref(),
            ProtocolVersion::Current => self.current.as_ref(),
        }
    }

    /// Releases this vendor has a connection for.
    pub fn supported_versions(&self) -> Vec<ProtocolVersion> {
        ProtocolVersion::all()
            .iter()
            .copied()
            .filter(|v| self.connection(*v).is_some())
            .collect()
    }
}

// ============================================================================
// Path Components
// ============================================================================

/// Makes `name` usable as a single path component under an output root.
///
/// Separators and control characters become `_`. A name that is empty or
/// made only of dots gets a leading `_`.
pub fn path_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.chars().all(|c| c == '.') {
        format!("_{cleaned}")
    } else {
        cleaned
    }
}

/// Directory name for a vendor: a safe path component with spaces as dashes.
pub fn vendor_dir_name(vendor_name: &str) -> String {
    path_component(vendor_name).replace(' ', "-")
}
