// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Verdant shopping assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Verdant configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VerdantConfig {
    /// Assistant identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Web search capability settings (research agent).
    #[serde(default)]
    pub search: SearchConfig,

    /// Chat policy settings (rate limit, context budget).
    #[serde(default)]
    pub chat: ChatConfig,

    /// Storefront links exposed by the cart and order agents.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "verdant".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default model for classification and sub-agent reasoning.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("verdant").join("verdant.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("verdant.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token required on /v1 routes. `None` disables auth.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}

/// Web search capability configuration.
///
/// The research agent answers plant-care questions from live search
/// results; without an API key its search tool reports the capability as
/// unavailable instead of answering unsourced.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Search API key. `None` disables live search.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Search API endpoint.
    #[serde(default = "default_search_base_url")]
    pub base_url: String,

    /// Maximum results to request per query.
    #[serde(default = "default_search_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_search_base_url(),
            max_results: default_search_max_results(),
        }
    }
}

fn default_search_base_url() -> String {
    "https://api.tavily.com/search".to_string()
}

fn default_search_max_results() -> usize {
    5
}

/// Chat policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Hard cap on messages per user before blocking.
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: i64,

    /// Token budget for the trimmed history window sent to sub-agents.
    #[serde(default = "default_context_budget")]
    pub context_budget_tokens: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            rate_limit_max: default_rate_limit_max(),
            context_budget_tokens: default_context_budget(),
        }
    }
}

fn default_rate_limit_max() -> i64 {
    10
}

fn default_context_budget() -> usize {
    3000
}

/// Storefront link configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Base URL of the storefront, used to build checkout and order
    /// deep links.
    #[serde(default = "default_site_base_url")]
    pub site_base_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            site_base_url: default_site_base_url(),
        }
    }
}

fn default_site_base_url() -> String {
    "https://verdant.live".to_string()
}

impl StoreConfig {
    /// Deep link to the checkout page.
    pub fn checkout_url(&self) -> String {
        format!("{}/cart/checkout/", self.site_base_url.trim_end_matches('/'))
    }

    /// Deep link to the user's orders page.
    pub fn my_orders_url(&self) -> String {
        format!(
            "{}/accounts/my_orders/",
            self.site_base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = VerdantConfig::default();
        assert_eq!(config.agent.name, "verdant");
        assert_eq!(config.chat.rate_limit_max, 10);
        assert_eq!(config.gateway.port, 8080);
        assert!(config.anthropic.api_key.is_none());
    }

    #[test]
    fn store_urls_handle_trailing_slash() {
        let store = StoreConfig {
            site_base_url: "https://verdant.live/".to_string(),
        };
        assert_eq!(store.checkout_url(), "https://verdant.live/cart/checkout/");
        assert_eq!(
            store.my_orders_url(),
            "https://verdant.live/accounts/my_orders/"
        );
    }

    #[test]
    fn unknown_section_key_is_rejected() {
        let toml_str = r#"
[agent]
name = "test"
naem = "oops"
"#;
        let result = toml::from_str::<VerdantConfig>(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn sections_deserialize_from_toml() {
        let toml_str = r#"
[anthropic]
default_model = "claude-haiku-4-5-20250901"
max_tokens = 512

[chat]
rate_limit_max = 3

[store]
site_base_url = "https://shop.example"
"#;
        let config: VerdantConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.anthropic.default_model, "claude-haiku-4-5-20250901");
        assert_eq!(config.anthropic.max_tokens, 512);
        assert_eq!(config.chat.rate_limit_max, 3);
        assert_eq!(config.store.checkout_url(), "https://shop.example/cart/checkout/");
        // Untouched sections keep defaults.
        assert_eq!(config.gateway.host, "127.0.0.1");
    }
}
