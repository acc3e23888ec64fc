// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `verdant serve` command implementation.
//!
//! Starts the full Verdant assistant with SQLite storage, the Anthropic
//! provider, the dialogue orchestrator, and the HTTP gateway, then serves
//! until the process exits.

use std::sync::Arc;

use tracing::{error, info, warn};

use verdant_agent::Orchestrator;
use verdant_anthropic::AnthropicProvider;
use verdant_config::model::VerdantConfig;
use verdant_core::error::VerdantError;
use verdant_core::{ProviderAdapter, StorageAdapter};
use verdant_gateway::{start_server, AppState, AuthConfig, HealthState, ServerConfig};
use verdant_storage::SqliteStorage;

/// Runs the `verdant serve` command.
///
/// Initializes storage and the provider, builds the orchestrator, and
/// serves the HTTP gateway. Supports the same configuration sources as
/// every other subcommand (files, then environment overrides).
pub async fn run_serve(config: VerdantConfig) -> Result<(), VerdantError> {
    // Initialize tracing subscriber.
    init_tracing(&config.agent.log_level);

    info!("starting verdant serve");

    // Initialize storage.
    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage) as Arc<dyn StorageAdapter>
    };

    // Initialize Anthropic provider.
    let provider = {
        let p = AnthropicProvider::new(&config).map_err(|e| {
            error!(error = %e, "failed to initialize Anthropic provider");
            eprintln!(
                "error: Anthropic API key required. Set via: config or ANTHROPIC_API_KEY env var"
            );
            e
        })?;
        Arc::new(p) as Arc<dyn ProviderAdapter>
    };

    // The gateway serves open /v1 endpoints when no token is configured.
    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token not set -- /v1 endpoints are unauthenticated");
    }

    let orchestrator = Arc::new(Orchestrator::new(provider, storage.clone(), config.clone()));

    let state = AppState {
        orchestrator,
        storage,
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
        },
    };

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    start_server(&server_config, state).await?;

    info!("verdant serve shutdown complete");
    Ok(())
}

/// Builds the default tracing filter directive string.
///
/// One directive per workspace crate at the configured level; everything
/// else (hyper, reqwest, sqlite internals) stays at warn.
fn default_filter(log_level: &str) -> String {
    let crates = [
        "verdant",
        "verdant_agent",
        "verdant_anthropic",
        "verdant_catalog",
        "verdant_gateway",
        "verdant_storage",
        "verdant_tools",
    ];
    let mut directives: Vec<String> = crates
        .iter()
        .map(|name| format!("{name}={log_level}"))
        .collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_workspace_crates() {
        let filter = default_filter("debug");
        assert!(filter.contains("verdant=debug"));
        assert!(filter.contains("verdant_agent=debug"));
        assert!(filter.contains("verdant_gateway=debug"));
        assert!(filter.ends_with(",warn"));
    }

    #[test]
    fn default_filter_uses_configured_level() {
        let filter = default_filter("trace");
        assert!(filter.contains("verdant_storage=trace"));
        assert!(!filter.contains("=debug"));
    }
}
