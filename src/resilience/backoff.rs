//! Exponential backoff with optional jitter.

use std::time::Duration;

use rand::Rng;

/// Backoff schedule applied between retry attempts.
///
/// The exponent restarts for every backend rotation: attempt `n` waits
/// `base * 2^(n mod max_retries_per_backend)`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_retries_per_backend: u32,
    /// Extra random delay as a fraction of the computed delay.
    pub jitter_ratio: f64,
}

impl Backoff {
    /// Delay to wait after the zero-based `attempt` failed.
    pub fn delay(&self, attempt: u32) -> Duration {
        let delay = calculate_backoff(attempt, self.max_retries_per_backend, self.base_delay, self.max_delay);
        apply_jitter(delay, self.jitter_ratio)
    }
}

/// Calculate the deterministic part of the backoff delay.
pub fn calculate_backoff(
    attempt: u32,
    max_retries_per_backend: u32,
    base: Duration,
    max: Duration,
) -> Duration {
    let exponent = attempt % max_retries_per_backend.max(1);
    let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(max)
}

fn apply_jitter(delay: Duration, ratio: f64) -> Duration {
    if ratio <= 0.0 {
        return delay;
    }

    let jitter_range = (delay.as_millis() as f64 * ratio) as u64;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    delay.saturating_add(Duration::from_millis(jitter))
}
