//! Failover inference client.
//!
//! The one entry point callers use. Owns the backend registry and hides
//! selection, probing, retry and backoff behind `chat_completion`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::{ConfigError, FailoverConfig, HealthCheckConfig, RetryConfig};
use crate::error::InferenceError;
use crate::health::HealthProbe;
use crate::inference::types::{build_request_body, ChatMessage, ChatOptions};
use crate::load_balancer::registry::BackendRegistry;
use crate::resilience::retries::{RetryCoordinator, RetryPolicy};
use crate::resilience::timeouts::Deadline;

/// Client that routes chat completions to whichever backend is healthy.
///
/// Cheap to share: wrap it in an `Arc` and call it from many tasks. All calls
/// share backend health, so failures seen by one call steer the next.
#[derive(Debug)]
pub struct InferenceClient {
    coordinator: RetryCoordinator,
}

impl InferenceClient {
    /// Build a client from a validated configuration.
    pub fn from_config(config: &FailoverConfig) -> Result<Self, ConfigError> {
        let registry = BackendRegistry::from_config(config)?;
        Self::new(registry, &config.health_check, &config.retries)
    }

    /// Build a client over an already populated registry.
    pub fn new(
        registry: BackendRegistry,
        health: &HealthCheckConfig,
        retries: &RetryConfig,
    ) -> Result<Self, ConfigError> {
        if registry.is_empty() {
            return Err(ConfigError::Validation(vec![
                crate::config::validation::ValidationError::MissingPrimaryHost,
            ]));
        }

        let coordinator = RetryCoordinator::new(
            Arc::new(registry),
            HealthProbe::from_config(health),
            RetryPolicy::from_config(retries, health),
        );
        Ok(Self { coordinator })
    }

    /// Send a chat completion and return the provider response unmodified.
    pub async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<Value, InferenceError> {
        let body = build_request_body(model, messages, options).map_err(InferenceError::InvalidRequest)?;
        let body = &body;
        self.coordinator
            .execute(|backend| async move { backend.transport().chat_completion(body).await })
            .await
    }

    /// Like [`chat_completion`](Self::chat_completion), bounded by `deadline`.
    pub async fn chat_completion_until(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatOptions,
        deadline: Deadline,
    ) -> Result<Value, InferenceError> {
        let body = build_request_body(model, messages, options).map_err(InferenceError::InvalidRequest)?;
        let body = &body;
        self.coordinator
            .execute_until(deadline, |backend| async move {
                backend.transport().chat_completion(body).await
            })
            .await
    }

    /// Name of the backend the next call will try first.
    pub fn current_backend_name(&self) -> String {
        self.registry()
            .current()
            .map(|b| b.name().to_string())
            .unwrap_or_default()
    }

    /// Health of every backend, keyed by name.
    pub fn backend_health_snapshot(&self) -> BTreeMap<String, bool> {
        self.registry()
            .all()
            .iter()
            .map(|b| (b.name().to_string(), b.is_healthy()))
            .collect()
    }

    /// Endpoint address of the backend the next call will try first.
    pub fn get_current_host(&self) -> String {
        self.registry()
            .current()
            .map(|b| b.endpoint().to_string())
            .unwrap_or_default()
    }

    /// Same as [`backend_health_snapshot`](Self::backend_health_snapshot).
    pub fn get_hosts_status(&self) -> BTreeMap<String, bool> {
        self.backend_health_snapshot()
    }

    /// Probe every backend now, ignoring the re-check interval.
    pub async fn probe_all(&self) -> BTreeMap<String, bool> {
        let probe = self.coordinator.selector().probe();
        let mut status = BTreeMap::new();
        for backend in self.registry().all() {
            let healthy = probe.check(backend).await;
            status.insert(backend.name().to_string(), healthy);
        }
        status
    }

    pub fn registry(&self) -> &BackendRegistry {
        self.coordinator.registry()
    }
}
