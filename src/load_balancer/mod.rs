//! Backend set and selection.
//!
//! # Data Flow
//! ```text
//! Config (primary_host, secondary_host)
//!     → registry.rs (build backends, bind transports)
//!     → selector.rs (first healthy backend from the cursor, with wraparound)
//!         - all unhealthy: emergency probe, then first backend anyway
//!     → backend.rs (health record updated by probes and dispatch outcomes)
//! ```
//!
//! # Design Decisions
//! - The backend set is fixed at construction; no add/remove at runtime
//! - This is failover, not load distribution: the cursor sticks to a
//!   backend until it turns unhealthy
//! - Selection never refuses to return a backend

pub mod backend;
pub mod registry;
pub mod selector;

pub use backend::Backend;
pub use registry::BackendRegistry;
pub use selector::BackendSelector;
