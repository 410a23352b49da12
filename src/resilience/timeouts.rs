//! Caller-supplied deadlines.
//!
//! # Responsibilities
//! - Bound each dispatch by the time left for the whole call
//! - Let the retry loop stop early instead of sleeping past the deadline

use std::future::Future;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

// Roughly 30 years, the same horizon tokio uses for far-future sleeps
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

fn saturating_from_now(delay: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Point in time after which a call must give up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Deadline(Instant);

impl Deadline {
    /// Deadline `budget` from now. Budgets past the clock's range are clamped.
    pub fn after(budget: Duration) -> Self {
        Self(saturating_from_now(budget))
    }

    /// Time left, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.0
    }

    /// Whether waiting `delay` would end past the deadline.
    pub fn would_expire_after(&self, delay: Duration) -> bool {
        saturating_from_now(delay) >= self.0
    }

    /// Run `fut`, giving up when the deadline passes.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        timeout_at(self.0, fut).await.ok()
    }
}
