//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active probes (active.rs):
//!     Selection reaches a backend
//!     → probe if the re-check interval has elapsed
//!     → update state.rs
//!
//! Passive tracking (retry loop):
//!     Dispatch outcome observed
//!     → success resets / failure increments
//!     → update state.rs if threshold reached
//!
//! State machine (state.rs):
//!     Healthy ←→ Unhealthy
//! ```
//!
//! # Design Decisions
//! - Probes run inline with selection; there is no background task
//! - Probe traffic is bounded by the interval, not by call volume
//! - Health state is per-backend and never surfaced as an error

pub mod active;
pub mod state;

pub use active::HealthProbe;
pub use state::{HealthRecord, HealthState};
