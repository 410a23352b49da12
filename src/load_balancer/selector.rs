//! Health-aware backend selection.
//!
//! The cursor stays on the backend that last served (or was chosen) and only
//! moves past a backend once it is unhealthy. Scanning starts at the cursor and
//! wraps once around the registry.

use std::sync::Arc;

use crate::health::HealthProbe;
use crate::load_balancer::backend::Backend;
use crate::load_balancer::registry::BackendRegistry;

/// Picks the next backend to attempt.
#[derive(Debug, Clone)]
pub struct BackendSelector {
    probe: HealthProbe,
}

impl BackendSelector {
    pub fn new(probe: HealthProbe) -> Self {
        Self { probe }
    }

    pub fn probe(&self) -> &HealthProbe {
        &self.probe
    }

    /// Select starting from the registry cursor.
    pub async fn next_available(&self, registry: &BackendRegistry) -> Option<Arc<Backend>> {
        self.next_available_from(registry, registry.current_index()).await
    }

    /// Select the first healthy backend at or after `start_index`.
    ///
    /// Each candidate gets a throttled probe before its health is read. When no
    /// backend is healthy, every backend is probed once regardless of the
    /// throttle; if that revives none, the first registered backend is returned
    /// anyway. Returns `None` only for an empty registry.
    pub async fn next_available_from(
        &self,
        registry: &BackendRegistry,
        start_index: usize,
    ) -> Option<Arc<Backend>> {
        let len = registry.len();
        if len == 0 {
            return None;
        }

        for offset in 0..len {
            let index = (start_index + offset) % len;
            let backend = &registry.all()[index];
            if self.probe.check_if_due(backend).await {
                registry.set_current_index(index);
                return Some(backend.clone());
            }
        }

        tracing::warn!(backend_count = len, "No healthy backends, probing all");
        for backend in registry.all() {
            self.probe.check(backend).await;
        }

        if let Some((index, backend)) = registry
            .all()
            .iter()
            .enumerate()
            .find(|(_, b)| b.is_healthy())
        {
            tracing::info!(backend = %backend.name(), "Backend recovered after emergency probe");
            registry.set_current_index(index);
            return Some(backend.clone());
        }

        let fallback = registry.all()[0].clone();
        tracing::warn!(
            backend = %fallback.name(),
            "All backends unhealthy, attempting first backend anyway"
        );
        registry.set_current_index(0);
        Some(fallback)
    }
}
