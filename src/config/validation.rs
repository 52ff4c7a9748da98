//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (base > 0, backoff > 1, 0 < random < 1)
//! - Check the backoff ceiling against the base timeout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Shares its range checks with `Timeout::new`

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::timeout::TimeoutError;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("timeout: {0}")]
    Timeout(#[from] TimeoutError),

    #[error("observability.log_level: unknown level {0:?}")]
    LogLevel(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors: Vec<ValidationError> = config
        .timeout
        .options()
        .problems(config.timeout.base_ms)
        .into_iter()
        .map(ValidationError::from)
        .collect();

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(
            config.observability.log_level.clone(),
        ));
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

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = AppConfig::default();
        config.timeout.base_ms = 0;
        config.timeout.backoff = Some(0.5);
        config.timeout.random = Some(1.5);
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::Timeout(TimeoutError::ZeroBase),
                ValidationError::Timeout(TimeoutError::InvalidBackoff(0.5)),
                ValidationError::Timeout(TimeoutError::InvalidRandomWindow(1.5)),
                ValidationError::LogLevel("loud".into()),
            ]
        );
    }

    #[test]
    fn test_ceiling_below_base() {
        let mut config = AppConfig::default();
        config.timeout.base_ms = 500;
        config.timeout.backoff = Some(2.0);
        config.timeout.backoff_max_ms = Some(100);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::Timeout(TimeoutError::InvalidBackoffMax {
                max: 100,
                base: 500
            })]
        );
    }
}
