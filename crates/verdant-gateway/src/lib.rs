// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Verdant shopping assistant.
//!
//! Exposes the dialogue orchestrator over a small REST surface: one
//! chat endpoint with interrupt/resume semantics, history and clear
//! endpoints for the thread, an administrative rate-limit reset, and an
//! unauthenticated health probe. Bearer-token auth guards the /v1
//! routes when configured.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{router, start_server, AppState, HealthState, ServerConfig};
