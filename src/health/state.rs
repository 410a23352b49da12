//! Backend health state machine.
//!
//! # States
//! - Healthy: backend is preferred by selection
//! - Unhealthy: backend is skipped unless nothing else is left
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: consecutive failures >= unhealthy_threshold
//! Unhealthy → Healthy: any successful probe or dispatch
//! ```
//!
//! # Design Decisions
//! - Failures keep counting while unhealthy; the state does not flap back
//! - A single success recovers (probes are already throttled)
//! - Transitions are returned to the caller so they can be logged

use tokio::time::Instant;

/// Health State enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

impl HealthState {
    pub fn is_healthy(self) -> bool {
        self == HealthState::Healthy
    }
}

/// Mutable health record of one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthRecord {
    pub state: HealthState,
    pub consecutive_failures: u32,
    /// `None` until the first probe.
    pub last_checked: Option<Instant>,
}

impl Default for HealthRecord {
    fn default() -> Self {
        Self {
            state: HealthState::Healthy,
            consecutive_failures: 0,
            last_checked: None,
        }
    }
}

impl HealthRecord {
    /// Record a success. Returns the new state if it changed.
    pub fn record_success(&mut self) -> Option<HealthState> {
        self.consecutive_failures = 0;
        self.transition_to(HealthState::Healthy)
    }

    /// Record a failure. Returns the new state if it changed.
    pub fn record_failure(&mut self, unhealthy_threshold: u32) -> Option<HealthState> {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.consecutive_failures >= unhealthy_threshold {
            self.transition_to(HealthState::Unhealthy)
        } else {
            None
        }
    }

    /// Whether a probe is due at `now` given the minimum re-check interval.
    pub fn probe_due(&self, now: Instant, interval: std::time::Duration) -> bool {
        match self.last_checked {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= interval,
        }
    }

    fn transition_to(&mut self, next: HealthState) -> Option<HealthState> {
        if self.state == next {
            None
        } else {
            self.state = next;
            Some(next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_threshold_flips_state() {
        let mut record = HealthRecord::default();
        assert_eq!(record.record_failure(3), None);
        assert_eq!(record.record_failure(3), None);
        assert_eq!(record.record_failure(3), Some(HealthState::Unhealthy));
        assert!(!record.state.is_healthy());

        // Further failures keep it down without another transition
        assert_eq!(record.record_failure(3), None);
        assert_eq!(record.state, HealthState::Unhealthy);
        assert_eq!(record.consecutive_failures, 4);
    }

    #[test]
    fn test_success_resets_and_recovers() {
        let mut record = HealthRecord::default();
        for _ in 0..5 {
            record.record_failure(3);
        }
        assert_eq!(record.record_success(), Some(HealthState::Healthy));
        assert_eq!(record.consecutive_failures, 0);

        record.record_failure(3);
        assert_eq!(record.record_success(), None);
        assert_eq!(record.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_due() {
        let interval = Duration::from_secs(300);
        let mut record = HealthRecord::default();
        let now = Instant::now();
        assert!(record.probe_due(now, interval));

        record.last_checked = Some(now);
        assert!(!record.probe_due(now, interval));

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(!record.probe_due(Instant::now(), interval));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(record.probe_due(Instant::now(), interval));
    }
}
