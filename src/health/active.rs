//! Active health checking.
//!
//! # Responsibilities
//! - Probe one backend's liveness endpoint on demand
//! - Throttle probes to one per backend per interval
//! - Update backend health state based on results

use std::time::Duration;

use tokio::time::Instant;

use crate::config::HealthCheckConfig;
use crate::load_balancer::backend::Backend;
use crate::observability::metrics;

/// Throttled liveness checker.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    interval: Duration,
    unhealthy_threshold: u32,
}

impl HealthProbe {
    pub fn new(interval: Duration, unhealthy_threshold: u32) -> Self {
        Self {
            interval,
            unhealthy_threshold,
        }
    }

    pub fn from_config(config: &HealthCheckConfig) -> Self {
        Self::new(Duration::from_secs(config.interval_secs), config.unhealthy_threshold)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn unhealthy_threshold(&self) -> u32 {
        self.unhealthy_threshold
    }

    /// Probe `backend` now, regardless of when it was last checked.
    pub async fn check(&self, backend: &Backend) -> bool {
        backend.touch_health_check(Instant::now());
        self.run_probe(backend).await
    }

    /// Probe `backend` only if the configured interval has elapsed since its
    /// last check; otherwise return the cached health.
    pub async fn check_if_due(&self, backend: &Backend) -> bool {
        if backend.claim_probe_if_due(Instant::now(), self.interval) {
            self.run_probe(backend).await
        } else {
            backend.is_healthy()
        }
    }

    async fn run_probe(&self, backend: &Backend) -> bool {
        match backend.transport().probe().await {
            Ok(()) => {
                tracing::debug!(backend = %backend.name(), "Health check passed");
                backend.mark_success();
                metrics::record_probe(backend.name(), true);
            }
            Err(e) => {
                tracing::warn!(backend = %backend.name(), error = %e, "Health check failed");
                backend.mark_failure(self.unhealthy_threshold);
                metrics::record_probe(backend.name(), false);
            }
        }
        backend.is_healthy()
    }
}
