// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL shape, non-empty paths, and non-zero intervals.

use crate::diagnostic::ConfigError;
use crate::model::FleetbookConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &FleetbookConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url `{base_url}` must start with http:// or https://"),
        });
    }

    if !config.api.health_path.starts_with('/') {
        errors.push(ConfigError::Validation {
            message: format!(
                "api.health_path `{}` must be an absolute path starting with `/`",
                config.api.health_path
            ),
        });
    }

    if config.http.timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "http.timeout_ms must be greater than zero".to_string(),
        });
    }

    if config.http.base_delay_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "http.base_delay_ms must be greater than zero".to_string(),
        });
    }

    if config.network.heartbeat_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "network.heartbeat_interval_secs must be greater than zero".to_string(),
        });
    }

    if config.network.failure_threshold == 0 {
        errors.push(ConfigError::Validation {
            message: "network.failure_threshold must be at least 1".to_string(),
        });
    }

    if config.outbox.max_attempts == 0 {
        errors.push(ConfigError::Validation {
            message: "outbox.max_attempts must be at least 1".to_string(),
        });
    }

    if config.intent.expiry_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "intent.expiry_secs must be greater than zero".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
