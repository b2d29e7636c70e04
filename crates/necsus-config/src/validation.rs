// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as a parseable server URL and consistent backoff bounds.

use crate::diagnostic::ConfigError;
use crate::model::NecsusConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &NecsusConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    match url::Url::parse(config.client.server_url.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ConfigError::Validation {
            message: format!(
                "client.server_url must use http or https, got `{}`",
                url.scheme()
            ),
        }),
        Err(e) => errors.push(ConfigError::Validation {
            message: format!(
                "client.server_url `{}` is not a valid URL: {e}",
                config.client.server_url
            ),
        }),
    }

    if config.client.room.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "client.room must not be empty".to_string(),
        });
    }

    if config.client.author.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "client.author must not be empty".to_string(),
        });
    }

    if config.reconnect.base_delay_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "reconnect.base_delay_ms must be greater than 0".to_string(),
        });
    }

    if config.reconnect.max_delay_ms < config.reconnect.base_delay_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "reconnect.max_delay_ms ({}) must be at least reconnect.base_delay_ms ({})",
                config.reconnect.max_delay_ms, config.reconnect.base_delay_ms
            ),
        });
    }

    if config.reconnect.connect_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "reconnect.connect_timeout_ms must be greater than 0".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
