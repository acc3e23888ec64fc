// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool trait, registry, and built-in store tools for the Verdant agents.
//!
//! This crate provides the unified [`Tool`] trait the built-in tools
//! implement. The [`ToolRegistry`] manages tool lookup and generates
//! Anthropic-format tool definitions for the LLM; each agent gets its own
//! registry built from the subset it is allowed to call.
//!
//! Built-in tools cover:
//! - cart operations ([`builtin::cart_registry`])
//! - order lookups ([`builtin::order_registry`])
//! - product recommendations ([`builtin::recommendation_registry`])
//! - web search ([`builtin::research_registry`])
//!
//! [`VariationSignal`] is the structured marker `add_to_cart` emits when a
//! product needs a variation choice before it can be added; the
//! orchestration layer decodes it from error outputs to pause the turn.

pub mod builtin;
pub mod signal;
pub mod tool;

pub use signal::VariationSignal;
pub use tool::{Tool, ToolOutput, ToolRegistry};
