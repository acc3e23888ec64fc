// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as valid bind addresses, non-empty paths, and positive limits.

use crate::diagnostic::ConfigError;
use crate::model::VerdantConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &VerdantConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate gateway host is not empty
    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    }

    // Validate gateway host looks like a valid IP or hostname
    if !config.gateway.host.trim().is_empty() {
        let addr = config.gateway.host.trim();
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{addr}` is not a valid IP address or hostname"),
            });
        }
    }

    // Validate database_path is not empty
    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    // Validate rate limit allows at least one message
    if config.chat.rate_limit_max < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.rate_limit_max must be at least 1, got {}",
                config.chat.rate_limit_max
            ),
        });
    }

    // Validate context budget is positive
    if config.chat.context_budget_tokens < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "chat.context_budget_tokens must be at least 1, got {}",
                config.chat.context_budget_tokens
            ),
        });
    }

    // Validate provider max_tokens is positive
    if config.anthropic.max_tokens < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "anthropic.max_tokens must be at least 1, got {}",
                config.anthropic.max_tokens
            ),
        });
    }

    // Validate store base URL scheme
    let base = config.store.site_base_url.trim();
    if !base.starts_with("http://") && !base.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("store.site_base_url `{base}` must start with http:// or https://"),
        });
    }

    // Validate search result cap
    if config.search.max_results < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "search.max_results must be at least 1, got {}",
                config.search.max_results
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
