// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use verdant_agent::Orchestrator;
use verdant_core::{StorageAdapter, VerdantError};

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The dialogue orchestrator every chat turn runs through.
    pub orchestrator: Arc<Orchestrator>,
    /// Storage handle for the history, clear, and limit endpoints.
    pub storage: Arc<dyn StorageAdapter>,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Health state for unauthenticated endpoints.
    pub health: HealthState,
}

/// Bind address for the gateway server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the gateway router.
///
/// Routes:
/// - POST /v1/chat (with auth when configured)
/// - GET /v1/history/{user_id} (with auth when configured)
/// - POST /v1/clear/{user_id} (with auth when configured)
/// - POST /v1/limits/{user_id}/reset (with auth when configured)
/// - GET /health (always open)
pub fn router(state: AppState) -> Router {
    let auth_state = state.auth.clone();

    // Unauthenticated public route (health probe for systemd and load
    // balancers).
    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .with_state(state.clone());

    // Chat and thread-management routes; the auth middleware is only
    // attached when a bearer token is configured.
    let mut api_routes = Router::new()
        .route("/v1/chat", post(handlers::post_chat))
        .route("/v1/history/{user_id}", get(handlers::get_history))
        .route("/v1/clear/{user_id}", post(handlers::post_clear))
        .route(
            "/v1/limits/{user_id}/reset",
            post(handlers::post_limits_reset),
        );
    if auth_state.bearer_token.is_some() {
        api_routes = api_routes.route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ));
    }
    let api_routes = api_routes.with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server.
///
/// Binds to the configured host:port and serves until the process
/// exits.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), VerdantError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| VerdantError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| VerdantError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
