// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./verdant.toml` > `~/.config/verdant/verdant.toml`
//! > `/etc/verdant/verdant.toml` with environment variable overrides via
//! `VERDANT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::VerdantConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/verdant/verdant.toml` (system-wide)
/// 3. `~/.config/verdant/verdant.toml` (user XDG config)
/// 4. `./verdant.toml` (local directory)
/// 5. `VERDANT_*` environment variables
pub fn load_config() -> Result<VerdantConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VerdantConfig::default()))
        .merge(Toml::file("/etc/verdant/verdant.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("verdant/verdant.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("verdant.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and for callers that already hold the TOML text.
pub fn load_config_from_str(toml_content: &str) -> Result<VerdantConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VerdantConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<VerdantConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(VerdantConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `VERDANT_ANTHROPIC_API_KEY` must map
/// to `anthropic.api_key`, not `anthropic.api.key`.
fn env_provider() -> Env {
    Env::prefixed("VERDANT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("search_", "search.", 1)
            .replacen("chat_", "chat.", 1)
            .replacen("store_", "store.", 1);
        mapped.into()
    })
}
