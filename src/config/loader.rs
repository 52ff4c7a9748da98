//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeout::Timeout;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.timeout.base_ms, 1000);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_full_file() {
        let config = parse_config(
            r#"
            [timeout]
            base_ms = 100
            backoff = 1.25
            backoff_max_ms = 150
            random = 0.1

            [observability]
            log_level = "debug"
            "#,
        )
        .unwrap();

        let timeout = Timeout::try_from(&config.timeout).unwrap();
        assert_eq!(timeout.base(), 100);
        assert_eq!(timeout.backoff(), Some(1.25));
        assert_eq!(timeout.backoff_max(), Some(150));
        let window = timeout.random_window().unwrap();
        assert!((window.max_multiplier() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_integer_backoff_is_accepted() {
        let config = parse_config("[timeout]\nbackoff = 2\n").unwrap();
        assert_eq!(config.timeout.backoff, Some(2.0));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config("[timeout]\nrandom = 0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: timeout: random window must be strictly between 0 and 1, got 0"
        );
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[timeout]\nbase_ms = \"soon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/backoff-timeout.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
