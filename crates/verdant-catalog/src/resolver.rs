// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Product name resolution and variation requirement policy.
//!
//! Matching order: exact case-insensitive name, then a single substring
//! match, then the first substring match by id with the alternatives
//! reported so they can be disclosed to the user. Callers must surface
//! `alternatives` whenever it is non-empty.

use std::collections::BTreeMap;
use std::sync::Arc;

use verdant_core::types::Product;
use verdant_core::{StorageAdapter, VerdantError};

/// Result of resolving a user-supplied product name.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub product: Product,
    /// Names of the other matches when a tie-break picked the first by id.
    /// Empty when the match was exact or unique.
    pub alternatives: Vec<String>,
}

/// Outcome of validating a variation selection against a product.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionCheck {
    /// Every required category has a valid value. Keys and values are
    /// canonicalized to the catalog's spelling.
    Complete(BTreeMap<String, String>),
    /// Categories that are missing or carry a value the catalog does not
    /// offer, in declaration order.
    Missing(Vec<String>),
}

/// Resolution policy over the catalog tables.
pub struct CatalogResolver {
    storage: Arc<dyn StorageAdapter>,
}

impl CatalogResolver {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Resolve a product name. Returns `None` when nothing matches.
    pub async fn find_product(&self, name: &str) -> Result<Option<Resolution>, VerdantError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        if let Some(product) = self.storage.find_product_exact(trimmed).await? {
            return Ok(Some(Resolution {
                product,
                alternatives: Vec::new(),
            }));
        }

        let mut matches = self.storage.find_products_containing(trimmed).await?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(Resolution {
                product: matches.remove(0),
                alternatives: Vec::new(),
            })),
            _ => {
                let product = matches.remove(0);
                let alternatives = matches.into_iter().map(|p| p.name).collect();
                Ok(Some(Resolution {
                    product,
                    alternatives,
                }))
            }
        }
    }

    /// Categories the user must choose before this product can be added.
    ///
    /// A category is required only if the product declares it AND at least
    /// one active variation row exists for it. Declaration order is kept.
    pub async fn required_variation_categories(
        &self,
        product: &Product,
    ) -> Result<Vec<String>, VerdantError> {
        let declared = product.declared_variation_categories();
        if declared.is_empty() {
            return Ok(Vec::new());
        }
        let active = self.storage.get_active_variations(product.id).await?;
        Ok(declared
            .into_iter()
            .filter(|category| {
                active
                    .iter()
                    .any(|v| v.category.to_lowercase() == *category)
            })
            .collect())
    }

    /// Active values offered for one of the product's categories.
    pub async fn variation_values(
        &self,
        product: &Product,
        category: &str,
    ) -> Result<Vec<String>, VerdantError> {
        let wanted = category.trim().to_lowercase();
        let active = self.storage.get_active_variations(product.id).await?;
        Ok(active
            .into_iter()
            .filter(|v| v.category.to_lowercase() == wanted)
            .map(|v| v.value)
            .collect())
    }

    /// Every required category mapped to its active values. This is the
    /// shape carried by a variation interrupt payload.
    pub async fn variation_options(
        &self,
        product: &Product,
    ) -> Result<BTreeMap<String, Vec<String>>, VerdantError> {
        let required = self.required_variation_categories(product).await?;
        let active = self.storage.get_active_variations(product.id).await?;
        let mut options = BTreeMap::new();
        for category in required {
            let values: Vec<String> = active
                .iter()
                .filter(|v| v.category.to_lowercase() == category)
                .map(|v| v.value.clone())
                .collect();
            options.insert(category, values);
        }
        Ok(options)
    }

    /// Validate a user-supplied selection against the product's
    /// requirements.
    ///
    /// Category and value matching is case-insensitive; the returned
    /// canonical set uses the catalog's spelling, so two users who typed
    /// "red" and "Red" produce equal cart lines. Selections that name a
    /// value the catalog does not offer count as missing: extracted
    /// arguments are untrusted and the check fails closed.
    pub async fn check_selection(
        &self,
        product: &Product,
        selection: &BTreeMap<String, String>,
    ) -> Result<SelectionCheck, VerdantError> {
        let required = self.required_variation_categories(product).await?;
        if required.is_empty() {
            return Ok(SelectionCheck::Complete(BTreeMap::new()));
        }

        let active = self.storage.get_active_variations(product.id).await?;
        let lowered: BTreeMap<String, &String> = selection
            .iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();

        let mut resolved = BTreeMap::new();
        let mut missing = Vec::new();
        for category in required {
            let supplied = lowered.get(&category);
            let canonical = supplied.and_then(|value| {
                active
                    .iter()
                    .find(|v| {
                        v.category.to_lowercase() == category
                            && v.value.to_lowercase() == value.trim().to_lowercase()
                    })
                    .map(|v| v.value.clone())
            });
            match canonical {
                Some(value) => {
                    resolved.insert(category, value);
                }
                None => missing.push(category),
            }
        }

        if missing.is_empty() {
            Ok(SelectionCheck::Complete(resolved))
        } else {
            Ok(SelectionCheck::Missing(missing))
        }
    }
}
