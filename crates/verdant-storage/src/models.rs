// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `verdant-core::types` for use across
//! adapter trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use verdant_core::types::{
    CartItem, ChatMessage, Order, OrderDetails, OrderItem, PendingSelection, Product,
    RateLimitState, Variation,
};
