//! Attempt policy for report calls.
//!
//! A report call makes a fixed number of attempts: two when the vendor
//! requires it, one otherwise. The second attempt is unconditional and does
//! not depend on how the first one went. Each attempt is raced against the
//! request timeout, and a 429 on a non-final attempt delays the next one.

use counterhub_core::{HarvestSettings, VendorConnection};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::transport::AttemptOutcome;

/// Fixed delay after a 429 before the next attempt.
pub const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(3);

/// How many attempts to make and how long each may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    /// Number of attempts, always made in full.
    pub attempts: u32,
    /// Upper bound for one attempt.
    pub timeout: Duration,
    /// Delay after a rate-limited non-final attempt.
    pub backoff: Duration,
}

impl AttemptPolicy {
    /// Creates a policy.
    pub fn new(attempts: u32, timeout: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            timeout,
            backoff: RATE_LIMIT_BACKOFF,
        }
    }

    /// Single attempt, used for discovery.
    pub fn single(timeout: Duration) -> Self {
        Self::new(1, timeout)
    }

    /// Policy for report calls to `connection`.
    pub fn for_connection(connection: &VendorConnection, settings: &HarvestSettings) -> Self {
        Self::new(connection.attempts_per_report(), settings.request_timeout)
    }

    /// Delay to insert after `attempt` (1-based) produced `outcome`.
    pub fn delay_after(&self, attempt: u32, outcome: &AttemptOutcome) -> Option<Duration> {
        (attempt < self.attempts && outcome.is_rate_limited()).then_some(self.backoff)
    }

    /// Runs every attempt and returns the final attempt's outcome.
    ///
    /// `make_attempt` is called once per attempt. When the timer expires the
    /// pending request is dropped and a timeout outcome stands in for it.
    pub async fn run<F, Fut>(&self, mut make_attempt: F) -> AttemptOutcome
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AttemptOutcome>,
    {
        let mut outcome = AttemptOutcome::NoResponse("no attempt made".to_string());
        for attempt in 1..=self.attempts {
            outcome = match tokio::time::timeout(self.timeout, make_attempt(attempt)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(attempt, timeout_secs = self.timeout.as_secs(), "Attempt timed out");
                    AttemptOutcome::TimedOut {
                        seconds: self.timeout.as_secs(),
                    }
                }
            };

            if let Some(delay) = self.delay_after(attempt, &outcome) {
                debug!(attempt, delay_secs = delay.as_secs(), "Rate limited, backing off");
                tokio::time::sleep(delay).await;
            }
        }
        outcome
    }
}
