// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Verdant shopping assistant.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Verdant workspace. The provider and
//! storage adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VerdantError;
pub use types::{AdapterType, AgentKind, HealthStatus, RouteDecision, TurnRequest, TurnResponse};

// Re-export all adapter traits at crate root.
pub use traits::{PluginAdapter, ProviderAdapter, StorageAdapter};
