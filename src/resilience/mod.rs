//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Logical request:
//!     → retries.rs (select backend, dispatch, classify failure)
//!     → backoff.rs (delay before the next attempt)
//!     → timeouts.rs (optional caller deadline bounds dispatch and backoff)
//! ```
//!
//! # Design Decisions
//! - Every backend call has a deadline (transport timeout or caller deadline)
//! - Only transient failures are retried
//! - Backoff restarts its exponent for each backend rotation

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{RetryCoordinator, RetryPolicy};
pub use timeouts::Deadline;
