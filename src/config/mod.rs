//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → FailoverConfig (validated, immutable)
//!     → consumed once when the client is built
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the backend set never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::BackendsConfig;
pub use schema::FailoverConfig;
pub use schema::HealthCheckConfig;
pub use schema::ObservabilityConfig;
pub use schema::RetryConfig;
pub use schema::TimeoutConfig;
