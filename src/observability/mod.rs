//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Selection, probes and the retry loop produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Every retry-loop event carries a per-call `request_id`
//! - Backend names label all metrics
//! - Metrics are cheap when no recorder is installed

pub mod logging;
pub mod metrics;
