//! Backend registry.
//!
//! # Responsibilities
//! - Hold the fixed, ordered set of backends built at startup
//! - Bind one transport to each backend
//! - Keep the selection cursor shared across calls

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::config::validation::{parse_host, ValidationError};
use crate::config::{ConfigError, FailoverConfig};
use crate::load_balancer::backend::Backend;
use crate::transport::http::{HttpTransport, HttpTransportSettings};
use crate::transport::BackendTransport;

pub const PRIMARY: &str = "primary";
pub const SECONDARY: &str = "secondary";

/// Ordered backends plus the round-robin cursor.
#[derive(Debug, Default)]
pub struct BackendRegistry {
    backends: Vec<Arc<Backend>>,
    /// Slot the selector resumes scanning from.
    cursor: AtomicUsize,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the `primary` and optional `secondary` backends from configuration.
    pub fn from_config(config: &FailoverConfig) -> Result<Self, ConfigError> {
        let settings = HttpTransportSettings {
            connect_timeout: Duration::from_secs(config.timeouts.connect_secs),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
            probe_timeout: Duration::from_secs(config.health_check.timeout_secs),
            probe_path: config.health_check.path.clone(),
        };

        let mut registry = Self::new();
        registry.register(PRIMARY, &config.backends.primary_host, &settings)?;
        if let Some(secondary) = &config.backends.secondary_host {
            registry.register(SECONDARY, secondary, &settings)?;
        }
        Ok(registry)
    }

    /// Register an HTTP backend for `address`.
    pub fn register(
        &mut self,
        name: &str,
        address: &str,
        settings: &HttpTransportSettings,
    ) -> Result<Arc<Backend>, ConfigError> {
        let invalid = |reason: String| {
            ConfigError::Validation(vec![ValidationError::InvalidHost {
                field: "backends",
                value: address.to_string(),
                reason,
            }])
        };

        let base_url = parse_host(address).map_err(invalid)?;
        let transport = HttpTransport::new(&base_url, settings).map_err(|e| invalid(e.to_string()))?;
        Ok(self.register_with_transport(name, base_url, Arc::new(transport)))
    }

    /// Register a backend with an explicit transport.
    pub fn register_with_transport(
        &mut self,
        name: &str,
        base_url: Url,
        transport: Arc<dyn BackendTransport>,
    ) -> Arc<Backend> {
        let backend = Arc::new(Backend::new(name, base_url, transport));
        tracing::info!(backend = %name, endpoint = %backend.endpoint(), "Backend registered");
        self.backends.push(backend.clone());
        backend
    }

    /// All backends in registration order.
    pub fn all(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Backend>> {
        self.backends.get(index)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Current cursor position, always a valid slot for a non-empty registry.
    pub fn current_index(&self) -> usize {
        match self.backends.len() {
            0 => 0,
            len => self.cursor.load(Ordering::Relaxed) % len,
        }
    }

    /// Move the cursor, wrapping modulo the registry length.
    pub fn set_current_index(&self, index: usize) {
        let len = self.backends.len().max(1);
        self.cursor.store(index % len, Ordering::Relaxed);
    }

    /// Backend under the cursor.
    pub fn current(&self) -> Option<&Arc<Backend>> {
        self.backends.get(self.current_index())
    }
}
