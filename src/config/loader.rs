//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::FailoverConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `backends.primary_host`.
pub const PRIMARY_HOST_ENV: &str = "INFERENCE_PRIMARY_HOST";
/// Environment variable overriding `backends.secondary_host`.
pub const SECONDARY_HOST_ENV: &str = "INFERENCE_SECONDARY_HOST";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
///
/// Environment overrides are applied after parsing and before validation.
pub fn load_config(path: &Path) -> Result<FailoverConfig, ConfigError> {
    let mut config = read_config(path)?;
    apply_env_overrides(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Read and parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<FailoverConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<FailoverConfig, ConfigError> {
    toml::from_str(content).map_err(ConfigError::Parse)
}

/// Apply host overrides from the process environment.
pub fn apply_env_overrides(config: &mut FailoverConfig) {
    apply_overrides(
        config,
        std::env::var(PRIMARY_HOST_ENV).ok(),
        std::env::var(SECONDARY_HOST_ENV).ok(),
    );
}

/// Apply explicit host overrides. Empty values are ignored.
pub fn apply_overrides(
    config: &mut FailoverConfig,
    primary: Option<String>,
    secondary: Option<String>,
) {
    if let Some(primary) = primary.filter(|h| !h.trim().is_empty()) {
        tracing::debug!(host = %primary, "Overriding primary host");
        config.backends.primary_host = primary;
    }
    if let Some(secondary) = secondary.filter(|h| !h.trim().is_empty()) {
        tracing::debug!(host = %secondary, "Overriding secondary host");
        config.backends.secondary_host = Some(secondary);
    }
}
