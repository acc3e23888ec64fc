// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Verdant integration tests.
//!
//! Provides mock adapters and storage harness helpers for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock LLM provider with pre-configured responses
//! - [`harness`] - temp SQLite storage plus catalog/order seeding helpers

pub mod harness;
pub mod mock_provider;

pub use harness::{seed_order, seed_product, seed_variation, temp_storage};
pub use mock_provider::{MockProvider, text_response, tool_use_response};
