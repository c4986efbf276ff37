// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as positive poll timings and a confidence threshold
//! inside (0, 1].

use crate::diagnostic::ConfigError;
use crate::model::CarereadyConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CarereadyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.queue.wait_time_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.wait_time_secs must be positive".to_string(),
        });
    }

    if config.queue.poll_interval_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.poll_interval_ms must be positive".to_string(),
        });
    }

    if config.queue.visibility_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.visibility_timeout_secs must be positive".to_string(),
        });
    }

    let threshold = config.inference.confidence_threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        errors.push(ConfigError::Validation {
            message: format!(
                "inference.confidence_threshold must be in (0, 1], got {threshold}"
            ),
        });
    }

    if config.inference.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "inference.base_url must not be empty".to_string(),
        });
    }

    if config.inference.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "inference.max_tokens must be positive".to_string(),
        });
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
    fn default_config_is_valid() {
        assert!(validate_config(&CarereadyConfig::default()).is_ok());
    }

    #[test]
    fn zero_wait_time_is_rejected() {
        let mut config = CarereadyConfig::default();
        config.queue.wait_time_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("wait_time_secs")));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut config = CarereadyConfig::default();
        config.inference.confidence_threshold = 1.5;
        assert!(validate_config(&config).is_err());

        config.inference.confidence_threshold = 0.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = CarereadyConfig::default();
        config.storage.database_path = "  ".to_string();
        config.queue.poll_interval_ms = 0;
        config.inference.max_tokens = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
