// SPDX-FileCopyrightText: 2026 Trunkq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes.

use thiserror::Error;

use crate::model::TrunkqConfig;

/// A single configuration validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    Validation { message: String },
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TrunkqConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.dispatch.reload_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dispatch.reload_interval_secs must be greater than zero".to_string(),
        });
    }

    if config.dispatch.max_retry < 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "dispatch.max_retry must be non-negative, got {}",
                config.dispatch.max_retry
            ),
        });
    }

    if config.gate.premium_number_length == 0 {
        errors.push(ConfigError::Validation {
            message: "gate.premium_number_length must be greater than zero".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
