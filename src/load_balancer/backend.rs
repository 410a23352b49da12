//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single inference endpoint
//! - Own the transport bound to that endpoint
//! - Track health state (Healthy/Unhealthy, consecutive failures, last probe)

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use url::Url;

use crate::health::state::{HealthRecord, HealthState};
use crate::observability::metrics;
use crate::transport::BackendTransport;

/// A single backend server.
pub struct Backend {
    /// Display name ("primary", "secondary").
    name: String,
    /// Base URL of the endpoint.
    base_url: Url,
    /// Transport bound to `base_url`.
    transport: Arc<dyn BackendTransport>,
    /// Health fields, mutated by probes and dispatch outcomes.
    health: Mutex<HealthRecord>,
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("name", &self.name)
            .field("base_url", &self.base_url.as_str())
            .field("health", &self.health_record())
            .finish()
    }
}

impl Backend {
    /// Create a new backend, healthy and never probed.
    pub fn new(name: impl Into<String>, base_url: Url, transport: Arc<dyn BackendTransport>) -> Self {
        Self {
            name: name.into(),
            base_url,
            transport,
            health: Mutex::new(HealthRecord::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoint address as reported by the transport.
    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    pub fn transport(&self) -> &dyn BackendTransport {
        self.transport.as_ref()
    }

    // --- Health Logic ---

    fn health(&self) -> MutexGuard<'_, HealthRecord> {
        // The record stays consistent even if a holder panicked
        self.health.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current health record.
    pub fn health_record(&self) -> HealthRecord {
        *self.health()
    }

    pub fn is_healthy(&self) -> bool {
        self.health().state.is_healthy()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.health().consecutive_failures
    }

    pub fn last_health_check(&self) -> Option<Instant> {
        self.health().last_checked
    }

    /// Report a successful request/check.
    pub fn mark_success(&self) {
        let transition = self.health().record_success();
        if let Some(state) = transition {
            self.log_transition(state);
        }
    }

    /// Report a failed request/check.
    pub fn mark_failure(&self, unhealthy_threshold: u32) {
        let (transition, failures) = {
            let mut health = self.health();
            (health.record_failure(unhealthy_threshold), health.consecutive_failures)
        };
        tracing::debug!(backend = %self.name, consecutive_failures = failures, "Backend failure recorded");
        if let Some(state) = transition {
            self.log_transition(state);
        }
    }

    /// Stamp the last health check time.
    pub fn touch_health_check(&self, now: Instant) {
        self.health().last_checked = Some(now);
    }

    /// Claim the next probe slot if `interval` has elapsed since the last one.
    ///
    /// Check and stamp happen under one lock, so concurrent callers cannot
    /// both win the same slot.
    pub fn claim_probe_if_due(&self, now: Instant, interval: Duration) -> bool {
        let mut health = self.health();
        if health.probe_due(now, interval) {
            health.last_checked = Some(now);
            true
        } else {
            false
        }
    }

    fn log_transition(&self, state: HealthState) {
        match state {
            HealthState::Healthy => {
                tracing::info!(backend = %self.name, endpoint = %self.endpoint(), "Backend is healthy again");
            }
            HealthState::Unhealthy => {
                tracing::warn!(backend = %self.name, endpoint = %self.endpoint(), "Backend marked unhealthy");
            }
        }
        metrics::record_backend_health(&self.name, state.is_healthy());
    }
}
