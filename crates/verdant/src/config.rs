// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `verdant config` command implementation.
//!
//! Prints the effective configuration after merging files and environment
//! overrides, with secret values redacted.

use verdant_config::model::VerdantConfig;
use verdant_core::VerdantError;

/// Runs the `verdant config` command.
pub fn run_config(config: &VerdantConfig) -> Result<(), VerdantError> {
    let rendered = toml::to_string_pretty(&redacted(config))
        .map_err(|e| VerdantError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

/// Returns a copy of the config with secret fields masked.
///
/// Covers every secret the config can carry: the Anthropic API key, the
/// search API key, and the gateway bearer token.
fn redacted(config: &VerdantConfig) -> VerdantConfig {
    let mut copy = config.clone();
    if copy.anthropic.api_key.is_some() {
        copy.anthropic.api_key = Some("[redacted]".to_string());
    }
    if copy.search.api_key.is_some() {
        copy.search.api_key = Some("[redacted]".to_string());
    }
    if copy.gateway.bearer_token.is_some() {
        copy.gateway.bearer_token = Some("[redacted]".to_string());
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacted_masks_set_secrets() {
        let mut config = VerdantConfig::default();
        config.anthropic.api_key = Some("sk-ant-secret".to_string());
        config.search.api_key = Some("tvly-secret".to_string());
        config.gateway.bearer_token = Some("bearer-secret".to_string());

        let masked = redacted(&config);
        assert_eq!(masked.anthropic.api_key.as_deref(), Some("[redacted]"));
        assert_eq!(masked.search.api_key.as_deref(), Some("[redacted]"));
        assert_eq!(masked.gateway.bearer_token.as_deref(), Some("[redacted]"));
    }

    #[test]
    fn redacted_leaves_unset_secrets_unset() {
        let config = VerdantConfig::default();
        let masked = redacted(&config);
        assert!(masked.anthropic.api_key.is_none());
        assert!(masked.search.api_key.is_none());
        assert!(masked.gateway.bearer_token.is_none());
    }

    #[test]
    fn redacted_preserves_non_secret_fields() {
        let mut config = VerdantConfig::default();
        config.gateway.port = 9999;
        config.anthropic.api_key = Some("sk-ant-secret".to_string());

        let masked = redacted(&config);
        assert_eq!(masked.gateway.port, 9999);
        assert_eq!(masked.agent.name, "verdant");
    }

    #[test]
    fn rendered_config_is_valid_toml() {
        let config = VerdantConfig::default();
        let rendered = toml::to_string_pretty(&redacted(&config)).unwrap();
        assert!(rendered.contains("[agent]"));
        assert!(rendered.contains("[gateway]"));
        let parsed: toml::Value = toml::from_str(&rendered).unwrap();
        assert!(parsed.get("anthropic").is_some());
    }
}
