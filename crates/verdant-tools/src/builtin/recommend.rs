// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recommendation tools: plant-specific product suggestions and raw
//! category listings for the recommendation agent to draw from.

use std::sync::Arc;

use async_trait::async_trait;
use verdant_core::VerdantError;
use verdant_core::traits::StorageAdapter;
use verdant_core::types::Product;

use crate::builtin::format_rupees;
use crate::tool::{Tool, ToolOutput};

const CARE_KEYWORDS: &[&str] = &["fertilizer", "fertiliser", "nutrient", "feed", "care"];
const CARE_CATEGORIES: &[&str] = &["Plant Care", "Fertilizer"];

fn storage_error(action: &str, e: VerdantError) -> ToolOutput {
    tracing::warn!(error = %e, action, "recommendation tool storage call failed");
    ToolOutput::error(format!("Error {action}: {e}"))
}

fn recommendation_line(icon: &str, product: &Product) -> String {
    let snippet: String = product.description.chars().take(100).collect();
    format!(
        "{icon} {} - {snippet}... (₹{})",
        product.name,
        format_rupees(product.price)
    )
}

/// Suggests care products and similar plants for an identified plant.
pub struct RecommendProductsForPlantTool {
    storage: Arc<dyn StorageAdapter>,
}

impl RecommendProductsForPlantTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Care products across both care categories, merged back into
    /// catalog id order so the sample is stable.
    async fn care_products(&self) -> Result<Vec<Product>, VerdantError> {
        let mut products = Vec::new();
        for category in CARE_CATEGORIES {
            products.extend(self.storage.get_products_by_category(category).await?);
        }
        products.sort_by_key(|p| p.id);
        Ok(products)
    }
}

#[async_trait]
impl Tool for RecommendProductsForPlantTool {
    fn name(&self) -> &str {
        "recommend_products_for_plant"
    }

    fn description(&self) -> &str {
        "Recommend products from the store catalog suitable for a specific plant: \
         fertilizers, plant care products, and similar plants"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "plant_name": {
                    "type": "string",
                    "description": "The identified plant to recommend products for"
                },
                "user_query": {
                    "type": "string",
                    "description": "The user's request, used to detect care-product intent"
                }
            },
            "required": ["plant_name"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, VerdantError> {
        let plant_name = input["plant_name"]
            .as_str()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();
        if plant_name.is_empty() {
            return Ok(ToolOutput::error("Error: missing 'plant_name' parameter"));
        }
        let user_query = input["user_query"]
            .as_str()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default();

        let mut recommended: Vec<String> = Vec::new();

        if CARE_KEYWORDS.iter().any(|word| user_query.contains(word)) {
            let care = match self.care_products().await {
                Ok(p) => p,
                Err(e) => return Ok(storage_error("recommending products", e)),
            };
            recommended.extend(care.iter().map(|p| recommendation_line("🌱", p)));
        }

        let similar = match self.storage.find_products_containing(&plant_name).await {
            Ok(p) => p,
            Err(e) => return Ok(storage_error("recommending products", e)),
        };
        recommended.extend(similar.iter().map(|p| recommendation_line("🌿", p)));

        if recommended.is_empty() {
            let general = match self.care_products().await {
                Ok(p) => p,
                Err(e) => return Ok(storage_error("recommending products", e)),
            };
            recommended.extend(
                general
                    .iter()
                    .take(5)
                    .map(|p| recommendation_line("🌱", p)),
            );
        }

        if recommended.is_empty() {
            return Ok(ToolOutput::text(format!(
                "I couldn't find specific products for {plant_name}, but you can browse \
                 our plant care and fertilizer categories for general care products."
            )));
        }

        Ok(ToolOutput::text(format!(
            "Here are some products that would be great for your {plant_name}:\n\n{}\
             \n\nYou can add any of these to your cart by saying 'Add [product name]'!",
            recommended.join("\n")
        )))
    }
}

/// Lists every available product in one store category.
pub struct GetProductsByCategoryTool {
    storage: Arc<dyn StorageAdapter>,
}

impl GetProductsByCategoryTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Tool for GetProductsByCategoryTool {
    fn name(&self) -> &str {
        "get_products_by_category"
    }

    fn description(&self) -> &str {
        "List the store's available products in one category. \
         Valid categories: 'Plants', 'Seeds', 'Planters', 'Plant Care'."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "category": {
                    "type": "string",
                    "description": "The category name to list products for"
                }
            },
            "required": ["category"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, VerdantError> {
        let Some(category) = input["category"].as_str().map(str::trim) else {
            return Ok(ToolOutput::error("Error: missing 'category' parameter"));
        };
        if category.is_empty() {
            return Ok(ToolOutput::error("Error: missing 'category' parameter"));
        }

        let products = match self.storage.get_products_by_category(category).await {
            Ok(p) => p,
            Err(e) => return Ok(storage_error("retrieving products", e)),
        };

        if products.is_empty() {
            // The empty marker is content for the model, not a failure:
            // the persona instructs it to say so and recommend nothing.
            return Ok(ToolOutput::text(
                "No products found in this category.\n\n\
                 No products found in this category in our store database.",
            ));
        }

        let lines: Vec<String> = products
            .iter()
            .map(|p| {
                let description = if p.description.is_empty() {
                    "A great plant store product"
                } else {
                    p.description.as_str()
                };
                format!("- {}: {description}", p.name)
            })
            .collect();
        Ok(ToolOutput::text(lines.join("\n")))
    }
}
