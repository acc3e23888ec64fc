// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage test harness helpers.
//!
//! Assembles a temp SQLite database and seeds catalog rows so
//! integration tests across crates share one setup idiom.

use std::sync::Arc;

use tempfile::TempDir;
use verdant_config::model::StorageConfig;
use verdant_core::VerdantError;
use verdant_core::traits::StorageAdapter;
use verdant_core::types::{Order, OrderItem, Product, Variation};
use verdant_storage::SqliteStorage;

/// Creates an initialized temp-file SQLite storage.
///
/// The returned `TempDir` must be kept alive for the storage's lifetime.
pub async fn temp_storage() -> Result<(Arc<dyn StorageAdapter>, TempDir), VerdantError> {
    let dir = TempDir::new().map_err(|e| VerdantError::Storage { source: e.into() })?;
    let db_path = dir.path().join("test.db");
    let storage = SqliteStorage::new(StorageConfig {
        database_path: db_path.to_string_lossy().to_string(),
        wal_mode: true,
    });
    storage.initialize().await?;
    Ok((Arc::new(storage), dir))
}

/// Inserts an available product, returning its id.
pub async fn seed_product(
    storage: &Arc<dyn StorageAdapter>,
    name: &str,
    price: i64,
    category: &str,
    allowed_variations: &str,
) -> Result<i64, VerdantError> {
    storage
        .insert_product(&Product {
            id: 0,
            name: name.to_string(),
            description: format!("{name} from the Verdant nursery"),
            price,
            stock: 25,
            is_available: true,
            category: category.to_string(),
            allowed_variations: allowed_variations.to_string(),
            created_at: String::new(),
        })
        .await
}

/// Inserts an active variation row for a product.
pub async fn seed_variation(
    storage: &Arc<dyn StorageAdapter>,
    product_id: i64,
    category: &str,
    value: &str,
    is_default: bool,
) -> Result<i64, VerdantError> {
    storage
        .insert_variation(&Variation {
            id: 0,
            product_id,
            category: category.to_string(),
            value: value.to_string(),
            is_active: true,
            is_default,
        })
        .await
}

/// Inserts an order with items, returning the order id. An empty
/// `created_at` takes the database clock.
pub async fn seed_order(
    storage: &Arc<dyn StorageAdapter>,
    user_id: i64,
    status: &str,
    total: i64,
    created_at: &str,
    items: &[(&str, i64)],
) -> Result<i64, VerdantError> {
    let items: Vec<OrderItem> = items
        .iter()
        .map(|(name, qty)| OrderItem {
            order_id: 0,
            product_name: name.to_string(),
            quantity: *qty,
        })
        .collect();
    storage
        .insert_order(
            &Order {
                id: 0,
                user_id,
                status: status.to_string(),
                total,
                created_at: created_at.to_string(),
            },
            &items,
        )
        .await
}
