// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cart tools: list, add, remove, variation listing, checkout link.
//!
//! Product name arguments are extracted from model output and therefore
//! untrusted; everything is validated against the catalog before a cart
//! row is touched. Name resolution policy: exact case-insensitive match
//! wins, else a single substring match, else the first substring match by
//! id with the alternatives disclosed in the reply.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use verdant_catalog::{CatalogResolver, Resolution, SelectionCheck};
use verdant_core::VerdantError;
use verdant_core::traits::StorageAdapter;
use verdant_core::types::CartItem;

use crate::builtin::parse_user_id;
use crate::signal::VariationSignal;
use crate::tool::{Tool, ToolOutput};

fn storage_error(action: &str, e: VerdantError) -> ToolOutput {
    tracing::warn!(error = %e, action, "cart tool storage call failed");
    ToolOutput::error(format!("Error {action}: {e}"))
}

fn user_id_schema() -> serde_json::Value {
    serde_json::json!({
        "type": ["integer", "string"],
        "description": "The numeric user ID from the conversation's 'User ID:{n}.' prefix"
    })
}

fn format_cart_line(item: &CartItem) -> String {
    if item.variation_set.is_empty() {
        format!("{} × {}", item.product_name, item.quantity)
    } else {
        let variations = item
            .variation_set
            .iter()
            .map(|(category, value)| format!("{category}: {value}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} ({}) × {}",
            item.product_name, variations, item.quantity
        )
    }
}

/// Lists the user's cart contents.
pub struct GetCartItemsTool {
    storage: Arc<dyn StorageAdapter>,
}

impl GetCartItemsTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Tool for GetCartItemsTool {
    fn name(&self) -> &str {
        "get_cart_items"
    }

    fn description(&self) -> &str {
        "Get the products in the cart by using user id"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "user_id": user_id_schema()
            },
            "required": ["user_id"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, VerdantError> {
        let user_id = match parse_user_id(&input["user_id"]) {
            Ok(id) => id,
            Err(msg) => return Ok(ToolOutput::error(msg)),
        };

        let items = match self.storage.list_cart_items(user_id).await {
            Ok(items) => items,
            Err(e) => return Ok(storage_error("retrieving cart items", e)),
        };

        if items.is_empty() {
            return Ok(ToolOutput::text("Your cart is empty."));
        }

        let lines: Vec<String> = items.iter().map(format_cart_line).collect();
        Ok(ToolOutput::text(lines.join("\n")))
    }
}

/// Adds a product to the cart by name, enforcing variation selection.
pub struct AddToCartTool {
    storage: Arc<dyn StorageAdapter>,
    resolver: Arc<CatalogResolver>,
}

impl AddToCartTool {
    pub fn new(storage: Arc<dyn StorageAdapter>, resolver: Arc<CatalogResolver>) -> Self {
        Self { storage, resolver }
    }

    /// Suggestion text for a query that matched nothing, trying the first
    /// word of the query against the catalog before giving up.
    async fn not_found_reply(&self, query: &str) -> Result<String, VerdantError> {
        let first_word = query.split_whitespace().next().unwrap_or("");
        if !first_word.is_empty() && !first_word.eq_ignore_ascii_case(query.trim()) {
            let similar = self.storage.find_products_containing(first_word).await?;
            if !similar.is_empty() {
                let names = similar
                    .iter()
                    .take(5)
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Ok(format!(
                    "No product found with name '{query}'. Did you mean: {names}? \
                     Please specify the exact product name."
                ));
            }
        }
        Ok(format!(
            "No product found with name '{query}'. Would you like to see the available \
             options or try adding a different plant?"
        ))
    }
}

#[async_trait]
impl Tool for AddToCartTool {
    fn name(&self) -> &str {
        "add_to_cart"
    }

    fn description(&self) -> &str {
        "Add a product to the cart by product name. If the product has selectable \
         variations, every required variation must be supplied; otherwise the tool \
         reports which ones are missing. Adding the same product with the same \
         variations again increases its quantity by 1."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "user_id": user_id_schema(),
                "product_name": {
                    "type": "string",
                    "description": "Name of the product to add"
                },
                "variations": {
                    "type": "object",
                    "description": "Variation choices as category/value pairs, e.g. {\"size\": \"small\"}",
                    "additionalProperties": { "type": "string" }
                }
            },
            "required": ["user_id", "product_name"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, VerdantError> {
        let user_id = match parse_user_id(&input["user_id"]) {
            Ok(id) => id,
            Err(msg) => return Ok(ToolOutput::error(msg)),
        };
        let Some(query) = input["product_name"].as_str().map(str::trim) else {
            return Ok(ToolOutput::error("Error: missing 'product_name' parameter"));
        };
        if query.is_empty() {
            return Ok(ToolOutput::error("Error: missing 'product_name' parameter"));
        }

        // Non-string variation values are dropped; the selection check
        // fails closed on whatever is left.
        let supplied: BTreeMap<String, String> = input["variations"]
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let resolution = match self.resolver.find_product(query).await {
            Ok(r) => r,
            Err(e) => return Ok(storage_error("adding to cart", e)),
        };
        let Some(Resolution {
            product,
            alternatives,
        }) = resolution
        else {
            return match self.not_found_reply(query).await {
                Ok(reply) => Ok(ToolOutput::error(reply)),
                Err(e) => Ok(storage_error("adding to cart", e)),
            };
        };

        let check = match self.resolver.check_selection(&product, &supplied).await {
            Ok(c) => c,
            Err(e) => return Ok(storage_error("adding to cart", e)),
        };

        let canonical = match check {
            SelectionCheck::Complete(canonical) => canonical,
            SelectionCheck::Missing(_) => {
                let options = match self.resolver.variation_options(&product).await {
                    Ok(o) => o,
                    Err(e) => return Ok(storage_error("adding to cart", e)),
                };
                let signal = VariationSignal::new(product.name.clone(), options);
                return Ok(ToolOutput::error(signal.encode()));
            }
        };

        let existing = match self.storage.list_cart_items(user_id).await {
            Ok(items) => items,
            Err(e) => return Ok(storage_error("adding to cart", e)),
        };
        let merged = existing
            .iter()
            .any(|item| item.product_id == product.id && item.variation_set == canonical);

        if let Err(e) = self
            .storage
            .upsert_cart_item(user_id, product.id, &canonical, 1)
            .await
        {
            return Ok(storage_error("adding to cart", e));
        }

        let base = if merged {
            format!(
                "Increased quantity of {} with selected variations.",
                product.name
            )
        } else {
            format!("Added {} to cart.", product.name)
        };

        if alternatives.is_empty() {
            Ok(ToolOutput::text(base))
        } else {
            let mut names = vec![product.name.clone()];
            names.extend(alternatives);
            names.truncate(5);
            Ok(ToolOutput::text(format!(
                "Multiple products found matching '{query}': {}. {base} \
                 If this is not correct, please specify the exact product name.",
                names.join(", ")
            )))
        }
    }
}

/// Removes cart lines whose product name contains the given fragment.
pub struct RemoveCartItemTool {
    storage: Arc<dyn StorageAdapter>,
}

impl RemoveCartItemTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Tool for RemoveCartItemTool {
    fn name(&self) -> &str {
        "remove_cart_item"
    }

    fn description(&self) -> &str {
        "Remove a product from the cart by product name"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "user_id": user_id_schema(),
                "product_name": {
                    "type": "string",
                    "description": "Name of the product to remove"
                }
            },
            "required": ["user_id", "product_name"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, VerdantError> {
        let user_id = match parse_user_id(&input["user_id"]) {
            Ok(id) => id,
            Err(msg) => return Ok(ToolOutput::error(msg)),
        };
        let Some(query) = input["product_name"].as_str().map(str::trim) else {
            return Ok(ToolOutput::error("Error: missing 'product_name' parameter"));
        };

        let items = match self.storage.list_cart_items(user_id).await {
            Ok(items) => items,
            Err(e) => return Ok(storage_error("removing item from cart", e)),
        };
        if items.is_empty() {
            return Ok(ToolOutput::text("Your cart is empty."));
        }

        let removed = match self.storage.remove_cart_items_matching(user_id, query).await {
            Ok(names) => names,
            Err(e) => return Ok(storage_error("removing item from cart", e)),
        };

        match removed.len() {
            0 => Ok(ToolOutput::error(format!(
                "No product found in cart with name '{query}'."
            ))),
            1 => Ok(ToolOutput::text(format!(
                "Removed {} from your cart.",
                removed[0]
            ))),
            n => Ok(ToolOutput::text(format!(
                "Removed {n} items from your cart: {}",
                removed.join(", ")
            ))),
        }
    }
}

/// Lists the selectable variation categories and values for a product.
pub struct ListProductVariationsTool {
    resolver: Arc<CatalogResolver>,
}

impl ListProductVariationsTool {
    pub fn new(resolver: Arc<CatalogResolver>) -> Self {
        Self { resolver }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[async_trait]
impl Tool for ListProductVariationsTool {
    fn name(&self) -> &str {
        "list_product_variations"
    }

    fn description(&self) -> &str {
        "List all available variation categories and values for a given product name"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "product_name": {
                    "type": "string",
                    "description": "Name of the product to inspect"
                }
            },
            "required": ["product_name"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, VerdantError> {
        let Some(query) = input["product_name"].as_str().map(str::trim) else {
            return Ok(ToolOutput::error("Error: missing 'product_name' parameter"));
        };

        let resolution = match self.resolver.find_product(query).await {
            Ok(r) => r,
            Err(e) => return Ok(storage_error("listing variations", e)),
        };
        let Some(Resolution { product, .. }) = resolution else {
            return Ok(ToolOutput::error(format!(
                "No product found with name '{query}'."
            )));
        };

        let declared = product.declared_variation_categories();
        if declared.is_empty() {
            return Ok(ToolOutput::text(format!(
                "'{}' does not have any selectable variations.",
                product.name
            )));
        }

        let mut lines = vec![format!("Available variations for '{}':", product.name)];
        for category in declared {
            let mut values = match self.resolver.variation_values(&product, &category).await {
                Ok(v) => v,
                Err(e) => return Ok(storage_error("listing variations", e)),
            };
            values.sort();
            values.dedup();
            if !values.is_empty() {
                lines.push(format!("- {}: {}", capitalize(&category), values.join(", ")));
            }
        }

        if lines.len() == 1 {
            return Ok(ToolOutput::text(format!(
                "No active variations found for '{}'.",
                product.name
            )));
        }
        Ok(ToolOutput::text(lines.join("\n")))
    }
}

/// Returns the checkout page deep link.
pub struct GetCheckoutUrlTool {
    url: String,
}

impl GetCheckoutUrlTool {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait]
impl Tool for GetCheckoutUrlTool {
    fn name(&self) -> &str {
        "get_checkout_url"
    }

    fn description(&self) -> &str {
        "Returns the URL for the checkout page"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn invoke(&self, _input: serde_json::Value) -> Result<ToolOutput, VerdantError> {
        Ok(ToolOutput::text(format!(
            "You can checkout your order here: {}",
            self.url
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use verdant_config::model::StorageConfig;
    use verdant_core::types::{Product, Variation};
    use verdant_storage::SqliteStorage;

    async fn setup() -> (Arc<dyn StorageAdapter>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("cart-tools.db");
        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_str().unwrap().to_string(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        (Arc::new(storage), dir)
    }

    async fn seed(
        storage: &Arc<dyn StorageAdapter>,
        name: &str,
        allowed: &str,
        variations: &[(&str, &str)],
    ) -> i64 {
        let id = storage
            .insert_product(&Product {
                id: 0,
                name: name.to_string(),
                description: String::new(),
                price: 19900,
                stock: 5,
                is_available: true,
                category: "Plants".to_string(),
                allowed_variations: allowed.to_string(),
                created_at: String::new(),
            })
            .await
            .unwrap();
        for (category, value) in variations {
            storage
                .insert_variation(&Variation {
                    id: 0,
                    product_id: id,
                    category: category.to_string(),
                    value: value.to_string(),
                    is_active: true,
                    is_default: false,
                })
                .await
                .unwrap();
        }
        id
    }

    fn add_tool(storage: &Arc<dyn StorageAdapter>) -> AddToCartTool {
        AddToCartTool::new(
            storage.clone(),
            Arc::new(CatalogResolver::new(storage.clone())),
        )
    }

    #[tokio::test]
    async fn get_cart_items_reports_empty_cart() {
        let (storage, _dir) = setup().await;
        let tool = GetCartItemsTool::new(storage);
        let out = tool
            .invoke(serde_json::json!({"user_id": 1}))
            .await
            .unwrap();
        assert_eq!(out.content, "Your cart is empty.");
        assert!(!out.is_error);
    }

    #[tokio::test]
    async fn get_cart_items_rejects_bad_user_id() {
        let (storage, _dir) = setup().await;
        let tool = GetCartItemsTool::new(storage);
        let out = tool
            .invoke(serde_json::json!({"user_id": "somebody"}))
            .await
            .unwrap();
        assert!(out.is_error);
        assert_eq!(out.content, "Error: Invalid user ID format");
    }

    #[tokio::test]
    async fn add_without_variations_then_list() {
        let (storage, _dir) = setup().await;
        seed(&storage, "Peace Lily", "", &[]).await;

        let add = add_tool(&storage);
        let out = add
            .invoke(serde_json::json!({"user_id": 1, "product_name": "peace lily"}))
            .await
            .unwrap();
        assert!(!out.is_error);
        assert_eq!(out.content, "Added Peace Lily to cart.");

        let list = GetCartItemsTool::new(storage);
        let out = list
            .invoke(serde_json::json!({"user_id": 1}))
            .await
            .unwrap();
        assert_eq!(out.content, "Peace Lily × 1");
    }

    #[tokio::test]
    async fn repeated_add_merges_quantity() {
        let (storage, _dir) = setup().await;
        seed(&storage, "Peace Lily", "", &[]).await;

        let add = add_tool(&storage);
        let input = serde_json::json!({"user_id": 1, "product_name": "Peace Lily"});
        add.invoke(input.clone()).await.unwrap();
        let out = add.invoke(input).await.unwrap();
        assert_eq!(
            out.content,
            "Increased quantity of Peace Lily with selected variations."
        );

        let list = GetCartItemsTool::new(storage);
        let out = list
            .invoke(serde_json::json!({"user_id": 1}))
            .await
            .unwrap();
        assert_eq!(out.content, "Peace Lily × 2");
    }

    #[tokio::test]
    async fn add_unknown_product_suggests_by_first_word() {
        let (storage, _dir) = setup().await;
        seed(&storage, "Snake Plant", "", &[]).await;

        let add = add_tool(&storage);
        let out = add
            .invoke(serde_json::json!({"user_id": 1, "product_name": "snake juice"}))
            .await
            .unwrap();
        assert!(out.is_error);
        assert!(
            out.content.contains("Did you mean: Snake Plant?"),
            "got: {}",
            out.content
        );
    }

    #[tokio::test]
    async fn add_unknown_product_without_suggestion() {
        let (storage, _dir) = setup().await;
        seed(&storage, "Snake Plant", "", &[]).await;

        let add = add_tool(&storage);
        let out = add
            .invoke(serde_json::json!({"user_id": 1, "product_name": "cactus"}))
            .await
            .unwrap();
        assert!(out.is_error);
        assert!(
            out.content
                .starts_with("No product found with name 'cactus'."),
            "got: {}",
            out.content
        );
    }

    #[tokio::test]
    async fn add_missing_variation_emits_signal_and_no_cart_line() {
        let (storage, _dir) = setup().await;
        seed(
            &storage,
            "Rose",
            "size",
            &[("size", "small"), ("size", "large")],
        )
        .await;

        let add = add_tool(&storage);
        let out = add
            .invoke(serde_json::json!({"user_id": 1, "product_name": "rose"}))
            .await
            .unwrap();
        assert!(out.is_error);

        let signal = VariationSignal::decode(&out.content).expect("should carry a signal");
        assert_eq!(signal.product_name, "Rose");
        assert_eq!(signal.variation_options["size"], vec!["small", "large"]);

        let items = storage.list_cart_items(1).await.unwrap();
        assert!(items.is_empty(), "no cart line may be created");
    }

    #[tokio::test]
    async fn add_with_complete_selection_creates_line() {
        let (storage, _dir) = setup().await;
        let product_id = seed(
            &storage,
            "Rose",
            "size",
            &[("size", "small"), ("size", "large")],
        )
        .await;

        let add = add_tool(&storage);
        let out = add
            .invoke(serde_json::json!({
                "user_id": 1,
                "product_name": "rose",
                "variations": {"Size": "SMALL"}
            }))
            .await
            .unwrap();
        assert!(!out.is_error, "got: {}", out.content);
        assert_eq!(out.content, "Added Rose to cart.");

        let items = storage.list_cart_items(1).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, product_id);
        assert_eq!(items[0].variation_set["size"], "small");
    }

    #[tokio::test]
    async fn tie_break_adds_and_discloses_alternatives() {
        let (storage, _dir) = setup().await;
        seed(&storage, "Snake Plant Large", "", &[]).await;
        seed(&storage, "Snake Plant Small", "", &[]).await;

        let add = add_tool(&storage);
        let out = add
            .invoke(serde_json::json!({"user_id": 1, "product_name": "snake plant"}))
            .await
            .unwrap();
        assert!(!out.is_error);
        assert!(
            out.content
                .contains("Multiple products found matching 'snake plant'"),
            "got: {}",
            out.content
        );
        assert!(out.content.contains("Snake Plant Small"));
        assert!(out.content.contains("Added Snake Plant Large to cart."));

        let items = storage.list_cart_items(1).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "Snake Plant Large");
    }

    #[tokio::test]
    async fn remove_reports_names_and_handles_empty_cart() {
        let (storage, _dir) = setup().await;
        seed(&storage, "Peace Lily", "", &[]).await;

        let remove = RemoveCartItemTool::new(storage.clone());
        let out = remove
            .invoke(serde_json::json!({"user_id": 1, "product_name": "lily"}))
            .await
            .unwrap();
        assert_eq!(out.content, "Your cart is empty.");

        let add = add_tool(&storage);
        add.invoke(serde_json::json!({"user_id": 1, "product_name": "Peace Lily"}))
            .await
            .unwrap();

        let out = remove
            .invoke(serde_json::json!({"user_id": 1, "product_name": "fern"}))
            .await
            .unwrap();
        assert!(out.is_error);
        assert_eq!(out.content, "No product found in cart with name 'fern'.");

        let out = remove
            .invoke(serde_json::json!({"user_id": 1, "product_name": "lily"}))
            .await
            .unwrap();
        assert_eq!(out.content, "Removed Peace Lily from your cart.");
    }

    #[tokio::test]
    async fn list_variations_formats_categories() {
        let (storage, _dir) = setup().await;
        seed(
            &storage,
            "Rose",
            "size,color",
            &[
                ("size", "small"),
                ("size", "large"),
                ("color", "red"),
                ("color", "white"),
            ],
        )
        .await;
        seed(&storage, "Peace Lily", "", &[]).await;

        let resolver = Arc::new(CatalogResolver::new(storage.clone()));
        let tool = ListProductVariationsTool::new(resolver);

        let out = tool
            .invoke(serde_json::json!({"product_name": "rose"}))
            .await
            .unwrap();
        assert_eq!(
            out.content,
            "Available variations for 'Rose':\n- Size: large, small\n- Color: red, white"
        );

        let out = tool
            .invoke(serde_json::json!({"product_name": "peace lily"}))
            .await
            .unwrap();
        assert_eq!(
            out.content,
            "'Peace Lily' does not have any selectable variations."
        );

        let out = tool
            .invoke(serde_json::json!({"product_name": "cactus"}))
            .await
            .unwrap();
        assert!(out.is_error);
        assert_eq!(out.content, "No product found with name 'cactus'.");
    }

    #[tokio::test]
    async fn checkout_url_tool_returns_link() {
        let tool = GetCheckoutUrlTool::new("https://verdant.live/cart/checkout/".to_string());
        let out = tool.invoke(serde_json::json!({})).await.unwrap();
        assert_eq!(
            out.content,
            "You can checkout your order here: https://verdant.live/cart/checkout/"
        );
    }
}
