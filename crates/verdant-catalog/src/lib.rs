// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog policy for the Verdant shopping assistant.
//!
//! Sits between the tool layer and raw storage: name resolution with a
//! deterministic tie-break, and the rules for when a product requires a
//! variation selection before it can enter a cart.

pub mod resolver;

pub use resolver::{CatalogResolver, Resolution, SelectionCheck};
