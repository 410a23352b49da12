//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that backend hosts resolve to usable base URLs
//! - Validate value ranges (intervals > 0, delays finite and ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: FailoverConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::FailoverConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backends.primary_host is required")]
    MissingPrimaryHost,

    #[error("{field}: invalid host '{value}': {reason}")]
    InvalidHost {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },

    #[error("{field} must be a finite, non-negative number")]
    InvalidDelay { field: &'static str },

    #[error("retries.max_delay_secs must not be lower than retries.base_delay_secs")]
    DelayBoundsInverted,

    #[error("retries.jitter_ratio must be within [0, 1]")]
    JitterOutOfRange,
}

/// Turn a configured host into a backend base URL.
///
/// `host:port` values get an `http://` scheme; full URLs are kept as given.
/// A trailing slash is dropped so paths can be appended directly.
pub fn parse_host(host: &str) -> Result<Url, String> {
    let trimmed = host.trim();
    if trimmed.is_empty() {
        return Err("host is empty".to_string());
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(candidate.trim_end_matches('/')).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }
    if url.host_str().is_none() {
        return Err("missing host name".to_string());
    }
    Ok(url)
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &FailoverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.primary_host.trim().is_empty() {
        errors.push(ValidationError::MissingPrimaryHost);
    } else if let Err(reason) = parse_host(&config.backends.primary_host) {
        errors.push(ValidationError::InvalidHost {
            field: "backends.primary_host",
            value: config.backends.primary_host.clone(),
            reason,
        });
    }

    if let Some(secondary) = &config.backends.secondary_host {
        if let Err(reason) = parse_host(secondary) {
            errors.push(ValidationError::InvalidHost {
                field: "backends.secondary_host",
                value: secondary.clone(),
                reason,
            });
        }
    }

    let positives = [
        ("health_check.interval_secs", config.health_check.interval_secs),
        ("health_check.timeout_secs", config.health_check.timeout_secs),
        ("health_check.unhealthy_threshold", u64::from(config.health_check.unhealthy_threshold)),
        ("retries.max_retries_per_backend", u64::from(config.retries.max_retries_per_backend)),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ];
    for (field, value) in positives {
        if value == 0 {
            errors.push(ValidationError::MustBePositive { field });
        }
    }

    let base = config.retries.base_delay_secs;
    let max = config.retries.max_delay_secs;
    let base_ok = base.is_finite() && base >= 0.0;
    let max_ok = max.is_finite() && max >= 0.0;
    if !base_ok {
        errors.push(ValidationError::InvalidDelay { field: "retries.base_delay_secs" });
    }
    if !max_ok {
        errors.push(ValidationError::InvalidDelay { field: "retries.max_delay_secs" });
    }
    if base_ok && max_ok && max < base {
        errors.push(ValidationError::DelayBoundsInverted);
    }

    let jitter = config.retries.jitter_ratio;
    if !(0.0..=1.0).contains(&jitter) {
        errors.push(ValidationError::JitterOutOfRange);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> FailoverConfig {
        let mut config = FailoverConfig::default();
        config.backends.primary_host = "localhost:11434".into();
        config
    }

    #[test]
    fn test_parse_host_adds_scheme() {
        let url = parse_host("gpu-box:11434").unwrap();
        assert_eq!(url.as_str(), "http://gpu-box:11434/");
        assert_eq!(url.host_str(), Some("gpu-box"));

        let url = parse_host("https://inference.internal/").unwrap();
        assert_eq!(url.scheme(), "https");

        assert!(parse_host("").is_err());
        assert!(parse_host("ftp://files:21").is_err());
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_primary_host() {
        let errors = validate_config(&FailoverConfig::default()).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingPrimaryHost]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.backends.secondary_host = Some("ftp://nope".into());
        config.retries.max_retries_per_backend = 0;
        config.retries.base_delay_secs = 10.0;
        config.retries.max_delay_secs = 1.0;
        config.retries.jitter_ratio = 1.5;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::MustBePositive {
            field: "retries.max_retries_per_backend"
        }));
        assert!(errors.contains(&ValidationError::DelayBoundsInverted));
        assert!(errors.contains(&ValidationError::JitterOutOfRange));
    }

    #[test]
    fn test_nan_delay_rejected() {
        let mut config = valid_config();
        config.retries.base_delay_secs = f64::NAN;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidDelay { field: "retries.base_delay_secs" }]
        );
    }
}
