// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in commerce tools.
//!
//! Each sub-agent gets a registry holding only its allowed tools; the
//! builder functions here assemble those fixed subsets.

pub mod cart;
pub mod orders;
pub mod recommend;
pub mod search;

pub use cart::{
    AddToCartTool, GetCartItemsTool, GetCheckoutUrlTool, ListProductVariationsTool,
    RemoveCartItemTool,
};
pub use orders::{
    GetMostRecentOrderTool, GetMyOrdersUrlTool, GetOrderDetailsByIdTool, GetOrdersByDateTool,
};
pub use recommend::{GetProductsByCategoryTool, RecommendProductsForPlantTool};
pub use search::WebSearchTool;

use std::sync::Arc;

use verdant_catalog::CatalogResolver;
use verdant_config::model::{SearchConfig, StoreConfig};
use verdant_core::traits::StorageAdapter;

use crate::ToolRegistry;

/// Assembles the cart agent's tool set.
pub fn cart_registry(
    storage: Arc<dyn StorageAdapter>,
    store: &StoreConfig,
) -> ToolRegistry {
    let resolver = Arc::new(CatalogResolver::new(storage.clone()));
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(GetCartItemsTool::new(storage.clone())));
    registry.register(Arc::new(AddToCartTool::new(
        storage.clone(),
        resolver.clone(),
    )));
    registry.register(Arc::new(RemoveCartItemTool::new(storage.clone())));
    registry.register(Arc::new(ListProductVariationsTool::new(resolver)));
    registry.register(Arc::new(GetCheckoutUrlTool::new(store.checkout_url())));
    registry
}

/// Assembles the order agent's tool set.
pub fn order_registry(
    storage: Arc<dyn StorageAdapter>,
    store: &StoreConfig,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(GetOrderDetailsByIdTool::new(storage.clone())));
    registry.register(Arc::new(GetOrdersByDateTool::new(storage.clone())));
    registry.register(Arc::new(GetMostRecentOrderTool::new(storage)));
    registry.register(Arc::new(GetMyOrdersUrlTool::new(store.my_orders_url())));
    registry
}

/// Assembles the recommendation agent's tool set.
pub fn recommendation_registry(storage: Arc<dyn StorageAdapter>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(RecommendProductsForPlantTool::new(
        storage.clone(),
    )));
    registry.register(Arc::new(GetProductsByCategoryTool::new(storage)));
    registry
}

/// Assembles the research agent's tool set.
pub fn research_registry(search: &SearchConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(WebSearchTool::new(search)));
    registry
}

/// Parses the `user_id` tool argument defensively.
///
/// Accepts a positive integer, a digit string, or the `User ID:{n}.`
/// prefix form the orchestrator injects into the conversation. Anything
/// else is rejected; tools never fall back to a different user.
pub(crate) fn parse_user_id(value: &serde_json::Value) -> Result<i64, String> {
    let invalid = || "Error: Invalid user ID format".to_string();
    match value {
        serde_json::Value::Number(n) => n.as_i64().filter(|id| *id > 0).ok_or_else(invalid),
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            let digits = match trimmed.strip_prefix("User ID:") {
                Some(rest) => rest.split('.').next().unwrap_or("").trim(),
                None => trimmed,
            };
            digits
                .parse::<i64>()
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

/// Formats a paise amount as rupees for display.
pub(crate) fn format_rupees(paise: i64) -> String {
    if paise % 100 == 0 {
        format!("{}", paise / 100)
    } else {
        format!("{}.{:02}", paise / 100, (paise % 100).abs())
    }
}
