//! Response classification.
//!
//! Every attempt result is sorted into exactly one [`Classification`]. Order
//! of checks:
//!
//! 1. No response at all, or the timer won: `NoResponse` / timeout exception.
//! 2. A JSON body carrying a numeric `Code` (bare, first array element, or
//!    under an `Exception` key): `ProtocolException`, whatever the status.
//! 3. A non-2xx status: `HttpError`.
//! 4. A body that is not JSON: `MalformedPayload`.
//! 5. Anything else: `ValidPayload`.

use counterhub_core::error::TIMEOUT_CODE;
use counterhub_core::{HarvestError, ProtocolException};
use serde_json::Value;
use tracing::debug;

use crate::transport::AttemptOutcome;

/// Result of classifying one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// A usable JSON body.
    ValidPayload(Value),
    /// A vendor-embedded exception, or the locally built timeout (code -1).
    ProtocolException(ProtocolException),
    /// A 2xx body that is not JSON.
    MalformedPayload(String),
    /// A non-2xx status without an exception body.
    HttpError {
        /// HTTP status code.
        status: u16,
        /// Reason phrase.
        status_text: String,
    },
    /// The request failed before any response.
    NoResponse(String),
}

/// Classifies attempt outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    /// Creates a validator.
    pub fn new() -> Self {
        Self
    }

    /// Classifies `outcome`.
    pub fn classify(&self, outcome: &AttemptOutcome) -> Classification {
        let response = match outcome {
            AttemptOutcome::NoResponse(message) => {
                return Classification::NoResponse(message.clone());
            }
            AttemptOutcome::TimedOut { seconds } => {
                return Classification::ProtocolException(
                    ProtocolException::new(TIMEOUT_CODE, format!("No response within {seconds}s"))
                        .with_severity(Some("Error".to_string())),
                );
            }
            AttemptOutcome::Response(response) => response,
        };

        let parsed = serde_json::from_str::<Value>(&response.body);

        if let Ok(body) = &parsed {
            if let Some(exception) = find_exception(body) {
                debug!(code = exception.code, status = response.status, "Protocol exception in body");
                return Classification::ProtocolException(exception);
            }
        }

        if !response.is_success() {
            return Classification::HttpError {
                status: response.status,
                status_text: response.status_text.clone(),
            };
        }

        match parsed {
            Ok(body) => Classification::ValidPayload(body),
            Err(e) => Classification::MalformedPayload(format!("body is not JSON: {e}")),
        }
    }

    /// Classifies `outcome` and converts anything but a valid payload into
    /// the matching [`HarvestError`].
    ///
    /// # Errors
    ///
    /// Returns the error for every classification other than
    /// [`Classification::ValidPayload`].
    pub fn validate(&self, outcome: &AttemptOutcome) -> Result<Value, HarvestError> {
        if let AttemptOutcome::TimedOut { seconds } = outcome {
            return Err(HarvestError::timeout(*seconds));
        }
        match self.classify(outcome) {
            Classification::ValidPayload(body) => Ok(body),
            Classification::ProtocolException(e) => Err(HarvestError::ProtocolException(e)),
            Classification::MalformedPayload(message) => {
                Err(HarvestError::MalformedPayload { message })
            }
            Classification::HttpError {
                status,
                status_text,
            } => Err(HarvestError::Http {
                status,
                status_text,
            }),
            Classification::NoResponse(message) => Err(HarvestError::Network { message }),
        }
    }
}

/// Looks for an exception object at the top level, in the first array
/// element, or under an `Exception` key.
fn find_exception(body: &Value) -> Option<ProtocolException> {
    let candidate = match body {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let object = candidate.as_object()?;

    if let Some(exception) = parse_exception(object) {
        return Some(exception);
    }
    ["Exception", "exception"]
        .iter()
        .filter_map(|key| object.get(*key))
        .filter_map(Value::as_object)
        .find_map(parse_exception)
}

fn parse_exception(object: &serde_json::Map<String, Value>) -> Option<ProtocolException> {
    let field = |upper: &str, lower: &str| object.get(upper).or_else(|| object.get(lower));

    let code = field("Code", "code")?.as_i64()?;
    let message = field("Message", "message")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let severity = field("Severity", "severity")
        .and_then(Value::as_str)
        .map(ToString::to_string);
    let data = field("Data", "data").and_then(|d| match d {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    });

    Some(
        ProtocolException::new(code, message)
            .with_severity(severity)
            .with_data(data),
    )
}
