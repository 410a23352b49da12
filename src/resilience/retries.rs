//! Retry logic.
//!
//! # Responsibilities
//! - Run one logical operation against successive backends
//! - Feed dispatch outcomes back into backend health
//! - Sleep with exponential backoff between attempts
//! - Enforce the total attempt budget and the caller's deadline
//!
//! # Design Decisions
//! - Attempts are strictly sequential; nothing runs concurrently per call
//! - Terminal errors return at once and do not count against the backend
//! - Budget is `max_retries_per_backend * backend_count`

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::Instrument;

use crate::config::{HealthCheckConfig, RetryConfig};
use crate::error::InferenceError;
use crate::health::HealthProbe;
use crate::load_balancer::backend::Backend;
use crate::load_balancer::registry::BackendRegistry;
use crate::load_balancer::selector::BackendSelector;
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;
use crate::resilience::timeouts::Deadline;
use crate::transport::DispatchError;

/// Retry settings resolved from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries_per_backend: u32,
    pub unhealthy_threshold: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn from_config(retries: &RetryConfig, health: &HealthCheckConfig) -> Self {
        let max_retries_per_backend = retries.max_retries_per_backend.max(1);
        Self {
            max_retries_per_backend,
            unhealthy_threshold: health.unhealthy_threshold,
            backoff: Backoff {
                base_delay: secs(retries.base_delay_secs),
                max_delay: secs(retries.max_delay_secs),
                max_retries_per_backend,
                jitter_ratio: retries.jitter_ratio,
            },
        }
    }
}

// Values past Duration's range saturate; negative or NaN mean no delay
fn secs(value: f64) -> Duration {
    match Duration::try_from_secs_f64(value) {
        Ok(duration) => duration,
        Err(_) if value > 0.0 => Duration::MAX,
        Err(_) => Duration::ZERO,
    }
}

/// Bookkeeping for one `execute` call.
#[derive(Debug, Default)]
struct AttemptContext {
    attempts: u32,
    hosts_tried: Vec<String>,
    last_error: Option<DispatchError>,
}

impl AttemptContext {
    fn record(&mut self, backend: &Backend) {
        self.attempts += 1;
        if !self.hosts_tried.iter().any(|name| name == backend.name()) {
            self.hosts_tried.push(backend.name().to_string());
        }
    }

    fn exhausted(self) -> InferenceError {
        InferenceError::Exhausted {
            hosts_tried: self.hosts_tried,
            attempts: self.attempts,
            last_error: self.last_error,
        }
    }

    fn deadline_exceeded(self) -> InferenceError {
        InferenceError::DeadlineExceeded {
            hosts_tried: self.hosts_tried,
            attempts: self.attempts,
            last_error: self.last_error,
        }
    }
}

/// Drives retry, failover and backoff around one operation.
#[derive(Debug)]
pub struct RetryCoordinator {
    registry: Arc<BackendRegistry>,
    selector: BackendSelector,
    policy: RetryPolicy,
}

impl RetryCoordinator {
    pub fn new(registry: Arc<BackendRegistry>, probe: HealthProbe, policy: RetryPolicy) -> Self {
        Self {
            registry,
            selector: BackendSelector::new(probe),
            policy,
        }
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    pub fn selector(&self) -> &BackendSelector {
        &self.selector
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Total number of dispatch attempts one call may make.
    pub fn budget(&self) -> u32 {
        let backends = u32::try_from(self.registry.len()).unwrap_or(u32::MAX);
        self.policy.max_retries_per_backend.saturating_mul(backends)
    }

    /// Run `operation` until it succeeds, fails terminally, or the budget is spent.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T, InferenceError>
    where
        F: FnMut(Arc<Backend>) -> Fut,
        Fut: Future<Output = Result<T, DispatchError>>,
    {
        self.run(None, operation).await
    }

    /// Like [`execute`](Self::execute), but gives up once `deadline` passes.
    pub async fn execute_until<T, F, Fut>(
        &self,
        deadline: Deadline,
        operation: F,
    ) -> Result<T, InferenceError>
    where
        F: FnMut(Arc<Backend>) -> Fut,
        Fut: Future<Output = Result<T, DispatchError>>,
    {
        self.run(Some(deadline), operation).await
    }

    async fn run<T, F, Fut>(&self, deadline: Option<Deadline>, operation: F) -> Result<T, InferenceError>
    where
        F: FnMut(Arc<Backend>) -> Fut,
        Fut: Future<Output = Result<T, DispatchError>>,
    {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("inference", %request_id);
        self.attempt_loop(deadline, operation).instrument(span).await
    }

    async fn attempt_loop<T, F, Fut>(
        &self,
        deadline: Option<Deadline>,
        mut operation: F,
    ) -> Result<T, InferenceError>
    where
        F: FnMut(Arc<Backend>) -> Fut,
        Fut: Future<Output = Result<T, DispatchError>>,
    {
        let budget = self.budget();
        let mut ctx = AttemptContext::default();

        for attempt in 0..budget {
            if deadline.is_some_and(|d| d.is_expired()) {
                tracing::warn!(attempt, "Deadline passed before next attempt");
                return Err(ctx.deadline_exceeded());
            }

            let backend = self
                .selector
                .next_available(&self.registry)
                .await
                .ok_or(InferenceError::NoBackends)?;
            ctx.record(&backend);

            tracing::debug!(
                attempt = attempt + 1,
                budget,
                backend = %backend.name(),
                "Dispatching to backend"
            );

            let started = Instant::now();
            let outcome = match deadline {
                Some(d) => match d.run(operation(backend.clone())).await {
                    Some(outcome) => outcome,
                    None => Err(DispatchError::Timeout {
                        endpoint: backend.endpoint().to_string(),
                        after: started.elapsed(),
                    }),
                },
                None => operation(backend.clone()).await,
            };

            match outcome {
                Ok(value) => {
                    backend.mark_success();
                    metrics::record_attempt(backend.name(), "success", started);
                    if attempt > 0 {
                        tracing::info!(attempts = attempt + 1, backend = %backend.name(), "Request succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_terminal() => {
                    metrics::record_attempt(backend.name(), "terminal", started);
                    tracing::warn!(backend = %backend.name(), error = %e, "Terminal request error, not retrying");
                    return Err(InferenceError::Terminal {
                        backend: backend.name().to_string(),
                        source: e,
                    });
                }
                Err(e) => {
                    metrics::record_attempt(backend.name(), e.kind(), started);
                    tracing::warn!(attempt = attempt + 1, backend = %backend.name(), error = %e, "Backend attempt failed");
                    backend.mark_failure(self.policy.unhealthy_threshold);
                    ctx.last_error = Some(e);
                }
            }

            if attempt + 1 < budget {
                let delay = self.policy.backoff.delay(attempt);
                if let Some(d) = deadline.filter(|d| d.would_expire_after(delay)) {
                    tracing::warn!(delay = ?delay, remaining = ?d.remaining(), "Backoff would cross deadline, giving up");
                    return Err(ctx.deadline_exceeded());
                }
                tracing::info!(attempt = attempt + 1, delay = ?delay, "Retrying request");
                tokio::time::sleep(delay).await;
            }
        }

        tracing::error!(
            attempts = ctx.attempts,
            hosts_tried = ?ctx.hosts_tried,
            "Retry budget exhausted"
        );
        Err(ctx.exhausted())
    }
}
