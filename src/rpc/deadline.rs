use std::time::Duration;

use tokio::time::Instant;

/// An absolute point in time after which an in-flight call is abandoned.
///
/// Deadlines are created per call from the call's timeout and are never shared between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    timeout: Duration,
}

impl Deadline {
    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            timeout,
        }
    }

    pub fn instant(&self) -> Instant {
        self.at
    }

    /// The timeout this deadline was created from.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }
}
