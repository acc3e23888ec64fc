// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::VerdantError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    CartItem, ChatMessage, Order, OrderDetails, OrderItem, PendingSelection, Product,
    RateLimitState, Variation,
};

/// Adapter for storage and persistence backends.
///
/// Storage adapters own the catalog, cart, order, chat-history,
/// checkpoint, and rate-limit tables. All string matching against
/// product names is case-insensitive at this layer; resolution policy
/// (tie-breaks, disclosure) lives in the catalog resolver above it.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connections).
    async fn initialize(&self) -> Result<(), VerdantError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), VerdantError>;

    // --- Catalog ---

    /// Inserts a product, returning its id.
    async fn insert_product(&self, product: &Product) -> Result<i64, VerdantError>;

    /// Inserts a variation row, returning its id.
    async fn insert_variation(&self, variation: &Variation) -> Result<i64, VerdantError>;

    /// Exact case-insensitive name lookup among available products.
    async fn find_product_exact(&self, name: &str) -> Result<Option<Product>, VerdantError>;

    /// Case-insensitive substring lookup among available products,
    /// ordered by id ascending.
    async fn find_products_containing(
        &self,
        fragment: &str,
    ) -> Result<Vec<Product>, VerdantError>;

    /// Available products in a category, ordered by id ascending.
    async fn get_products_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<Product>, VerdantError>;

    /// Active variation rows for a product.
    async fn get_active_variations(
        &self,
        product_id: i64,
    ) -> Result<Vec<Variation>, VerdantError>;

    // --- Cart ---

    /// All cart lines for a user, ordered by creation.
    async fn list_cart_items(&self, user_id: i64) -> Result<Vec<CartItem>, VerdantError>;

    /// Adds `delta_qty` to the line matching `(user, product,
    /// variation_set)`, creating the line if absent. The merge happens
    /// inside one serialized write so concurrent increments cannot be
    /// lost.
    async fn upsert_cart_item(
        &self,
        user_id: i64,
        product_id: i64,
        variation_set: &BTreeMap<String, String>,
        delta_qty: i64,
    ) -> Result<(), VerdantError>;

    /// Removes every cart line whose product name contains `fragment`
    /// (case-insensitive), returning the removed product names in line
    /// order.
    async fn remove_cart_items_matching(
        &self,
        user_id: i64,
        fragment: &str,
    ) -> Result<Vec<String>, VerdantError>;

    // --- Orders (read-only for the assistant; inserts are for seeding) ---

    /// Inserts an order with its items, returning the order id.
    async fn insert_order(
        &self,
        order: &Order,
        items: &[OrderItem],
    ) -> Result<i64, VerdantError>;

    /// Looks up one of the user's orders by id.
    async fn get_order(
        &self,
        user_id: i64,
        order_id: i64,
    ) -> Result<Option<OrderDetails>, VerdantError>;

    /// The user's orders placed on the given `YYYY-MM-DD` date.
    async fn get_orders_by_date(
        &self,
        user_id: i64,
        date: &str,
    ) -> Result<Vec<OrderDetails>, VerdantError>;

    /// The user's most recently placed order.
    async fn get_most_recent_order(
        &self,
        user_id: i64,
    ) -> Result<Option<OrderDetails>, VerdantError>;

    // --- Chat history ---

    /// Appends a chat message.
    async fn append_chat_message(&self, message: &ChatMessage) -> Result<(), VerdantError>;

    /// Full chat history for a user, oldest first.
    async fn get_chat_history(&self, user_id: i64) -> Result<Vec<ChatMessage>, VerdantError>;

    /// Deletes all chat messages for a user.
    async fn clear_chat_history(&self, user_id: i64) -> Result<(), VerdantError>;

    // --- Variation-selection checkpoint ---

    /// The user's pending variation selection, if any.
    async fn get_pending_selection(
        &self,
        user_id: i64,
    ) -> Result<Option<PendingSelection>, VerdantError>;

    /// Stores the pending selection, replacing any existing one (at most
    /// one per user).
    async fn set_pending_selection(
        &self,
        selection: &PendingSelection,
    ) -> Result<(), VerdantError>;

    /// Marks the pending selection as having been re-prompted once.
    async fn mark_selection_reprompted(&self, user_id: i64) -> Result<(), VerdantError>;

    /// Clears the pending selection.
    async fn clear_pending_selection(&self, user_id: i64) -> Result<(), VerdantError>;

    // --- Rate limiting ---

    /// Atomically increments the user's message counter, marking the user
    /// blocked once the counter exceeds `limit`, and returns the resulting
    /// state. Increment and block decision happen in one serialized write.
    async fn increment_message_count(
        &self,
        user_id: i64,
        limit: u32,
    ) -> Result<RateLimitState, VerdantError>;

    /// Current counter state, if the user has sent anything.
    async fn get_rate_limit(
        &self,
        user_id: i64,
    ) -> Result<Option<RateLimitState>, VerdantError>;

    /// Administrative reset: zeroes the counter and unblocks the user.
    async fn reset_rate_limit(&self, user_id: i64) -> Result<(), VerdantError>;
}
