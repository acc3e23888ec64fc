// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use verdant_config::model::StorageConfig;
use verdant_core::types::{
    CartItem, ChatMessage, Order, OrderDetails, OrderItem, PendingSelection, Product,
    RateLimitState, Variation,
};
use verdant_core::{AdapterType, HealthStatus, PluginAdapter, StorageAdapter, VerdantError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, VerdantError> {
        self.db.get().ok_or_else(|| VerdantError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, VerdantError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), VerdantError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), VerdantError> {
        let path = self.config.database_path.clone();
        let db = Database::open(&path).await?;
        self.db.set(db).map_err(|_| VerdantError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), VerdantError> {
        self.db()?.close().await
    }

    // --- Catalog ---

    async fn insert_product(&self, product: &Product) -> Result<i64, VerdantError> {
        queries::catalog::insert_product(self.db()?, product).await
    }

    async fn insert_variation(&self, variation: &Variation) -> Result<i64, VerdantError> {
        queries::catalog::insert_variation(self.db()?, variation).await
    }

    async fn find_product_exact(&self, name: &str) -> Result<Option<Product>, VerdantError> {
        queries::catalog::find_product_exact(self.db()?, name).await
    }

    async fn find_products_containing(
        &self,
        fragment: &str,
    ) -> Result<Vec<Product>, VerdantError> {
        queries::catalog::find_products_containing(self.db()?, fragment).await
    }

    async fn get_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, VerdantError> {
        queries::catalog::get_products_by_category(self.db()?, category).await
    }

    async fn get_active_variations(
        &self,
        product_id: i64,
    ) -> Result<Vec<Variation>, VerdantError> {
        queries::catalog::get_active_variations(self.db()?, product_id).await
    }

    // --- Cart ---

    async fn list_cart_items(&self, user_id: i64) -> Result<Vec<CartItem>, VerdantError> {
        queries::cart::list_cart_items(self.db()?, user_id).await
    }

    async fn upsert_cart_item(
        &self,
        user_id: i64,
        product_id: i64,
        variation_set: &BTreeMap<String, String>,
        delta_qty: i64,
    ) -> Result<(), VerdantError> {
        queries::cart::upsert_cart_item(self.db()?, user_id, product_id, variation_set, delta_qty)
            .await
    }

    async fn remove_cart_items_matching(
        &self,
        user_id: i64,
        fragment: &str,
    ) -> Result<Vec<String>, VerdantError> {
        queries::cart::remove_cart_items_matching(self.db()?, user_id, fragment).await
    }

    // --- Orders ---

    async fn insert_order(&self, order: &Order, items: &[OrderItem]) -> Result<i64, VerdantError> {
        queries::orders::insert_order(self.db()?, order, items).await
    }

    async fn get_order(
        &self,
        user_id: i64,
        order_id: i64,
    ) -> Result<Option<OrderDetails>, VerdantError> {
        queries::orders::get_order(self.db()?, user_id, order_id).await
    }

    async fn get_orders_by_date(
        &self,
        user_id: i64,
        date: &str,
    ) -> Result<Vec<OrderDetails>, VerdantError> {
        queries::orders::get_orders_by_date(self.db()?, user_id, date).await
    }

    async fn get_most_recent_order(
        &self,
        user_id: i64,
    ) -> Result<Option<OrderDetails>, VerdantError> {
        queries::orders::get_most_recent_order(self.db()?, user_id).await
    }

    // --- Chat history ---

    async fn append_chat_message(&self, message: &ChatMessage) -> Result<(), VerdantError> {
        queries::chat::append_chat_message(self.db()?, message).await
    }

    async fn get_chat_history(&self, user_id: i64) -> Result<Vec<ChatMessage>, VerdantError> {
        queries::chat::get_chat_history(self.db()?, user_id).await
    }

    async fn clear_chat_history(&self, user_id: i64) -> Result<(), VerdantError> {
        queries::chat::clear_chat_history(self.db()?, user_id).await
    }

    // --- Variation-selection checkpoint ---

    async fn get_pending_selection(
        &self,
        user_id: i64,
    ) -> Result<Option<PendingSelection>, VerdantError> {
        queries::checkpoint::get_pending_selection(self.db()?, user_id).await
    }

    async fn set_pending_selection(
        &self,
        selection: &PendingSelection,
    ) -> Result<(), VerdantError> {
        queries::checkpoint::set_pending_selection(self.db()?, selection).await
    }

    async fn mark_selection_reprompted(&self, user_id: i64) -> Result<(), VerdantError> {
        queries::checkpoint::mark_selection_reprompted(self.db()?, user_id).await
    }

    async fn clear_pending_selection(&self, user_id: i64) -> Result<(), VerdantError> {
        queries::checkpoint::clear_pending_selection(self.db()?, user_id).await
    }

    // --- Rate limiting ---

    async fn increment_message_count(
        &self,
        user_id: i64,
        limit: u32,
    ) -> Result<RateLimitState, VerdantError> {
        queries::ratelimit::increment_message_count(self.db()?, user_id, limit).await
    }

    async fn get_rate_limit(&self, user_id: i64) -> Result<Option<RateLimitState>, VerdantError> {
        queries::ratelimit::get_rate_limit(self.db()?, user_id).await
    }

    async fn reset_rate_limit(&self, user_id: i64) -> Result<(), VerdantError> {
        queries::ratelimit::reset_rate_limit(self.db()?, user_id).await
    }
}
