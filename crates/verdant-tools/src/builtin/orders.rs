// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order lookup tools: by id, by date, most recent, orders page link.
//!
//! Order data is read-only for the assistant. Dates arrive as natural
//! language and are parsed against a fixed set of formats; the stored
//! `created_at` timestamps are RFC 3339.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;
use verdant_core::VerdantError;
use verdant_core::traits::StorageAdapter;
use verdant_core::types::OrderDetails;

use crate::builtin::{format_rupees, parse_user_id};
use crate::tool::{Tool, ToolOutput};

fn storage_error(action: &str, e: VerdantError) -> ToolOutput {
    tracing::warn!(error = %e, action, "order tool storage call failed");
    ToolOutput::error(format!("Error {action}: {e}"))
}

static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(st|nd|rd|th)\b").unwrap());

/// Parses a natural-language date: ISO dates, `DD/MM/YYYY`, month-name
/// forms, `today`, `yesterday`. Returns `None` when nothing matches.
fn parse_fuzzy_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    if lowered == "today" {
        return Some(today);
    }
    if lowered == "yesterday" {
        return Some(today - Duration::days(1));
    }

    // "3rd June 2025" -> "3 June 2025"; "June 3, 2025" -> "June 3 2025".
    let normalized = ORDINAL_SUFFIX.replace_all(&lowered, "$1").replace(',', " ");
    let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");

    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%Y/%m/%d",
        "%d %B %Y",
        "%B %d %Y",
        "%d %b %Y",
        "%b %d %Y",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&normalized, fmt).ok())
}

/// Reformats a stored RFC 3339 timestamp for display, falling back to the
/// raw string when it does not parse.
fn format_timestamp(ts: &str, fmt: &str) -> String {
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.fZ")
        .map(|dt| dt.format(fmt).to_string())
        .unwrap_or_else(|_| ts.to_string())
}

fn items_inline(details: &OrderDetails) -> String {
    details
        .items
        .iter()
        .map(|item| format!("{} × {}", item.product_name, item.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

fn user_id_schema() -> serde_json::Value {
    serde_json::json!({
        "type": ["integer", "string"],
        "description": "The numeric user ID from the conversation's 'User ID:{n}.' prefix"
    })
}

/// Retrieves one order's details by order id.
pub struct GetOrderDetailsByIdTool {
    storage: Arc<dyn StorageAdapter>,
}

impl GetOrderDetailsByIdTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Tool for GetOrderDetailsByIdTool {
    fn name(&self) -> &str {
        "get_order_details_by_id"
    }

    fn description(&self) -> &str {
        "Retrieve order details (status, products, date, total) for a given order ID and user"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "user_id": user_id_schema(),
                "order_id": {
                    "type": ["integer", "string"],
                    "description": "The order ID to look up"
                }
            },
            "required": ["user_id", "order_id"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, VerdantError> {
        let user_id = match parse_user_id(&input["user_id"]) {
            Ok(id) => id,
            Err(msg) => return Ok(ToolOutput::error(msg)),
        };

        let raw = &input["order_id"];
        let order_id = match raw.as_i64().or_else(|| raw.as_str().and_then(|s| s.trim().parse().ok())) {
            Some(id) => id,
            // Unparseable ids cannot match an order; same reply.
            None => {
                return Ok(ToolOutput::error(format!(
                    "No order found with ID {}.",
                    raw.as_str().unwrap_or("?")
                )));
            }
        };

        let details = match self.storage.get_order(user_id, order_id).await {
            Ok(d) => d,
            Err(e) => return Ok(storage_error("retrieving order details", e)),
        };
        let Some(details) = details else {
            return Ok(ToolOutput::error(format!(
                "No order found with ID {order_id}."
            )));
        };

        let product_list = details
            .items
            .iter()
            .map(|item| format!("- {} × {}", item.product_name, item.quantity))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(ToolOutput::text(format!(
            "Order ID: {}\nStatus: {}\nDate: {}\nTotal: ₹{}\nProducts:\n{}",
            details.order.id,
            details.order.status,
            format_timestamp(&details.order.created_at, "%Y-%m-%d %H:%M:%S"),
            format_rupees(details.order.total),
            product_list
        )))
    }
}

/// Retrieves all orders placed on a given calendar date.
pub struct GetOrdersByDateTool {
    storage: Arc<dyn StorageAdapter>,
}

impl GetOrdersByDateTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Tool for GetOrdersByDateTool {
    fn name(&self) -> &str {
        "get_orders_by_date"
    }

    fn description(&self) -> &str {
        "Retrieve all orders for a user on a specific date. Accepts dates like \
         2025-06-03, 03/06/2025, 3 June 2025, today, or yesterday."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "user_id": user_id_schema(),
                "date": {
                    "type": "string",
                    "description": "The date to look up, as written by the user"
                }
            },
            "required": ["user_id", "date"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, VerdantError> {
        let user_id = match parse_user_id(&input["user_id"]) {
            Ok(id) => id,
            Err(msg) => return Ok(ToolOutput::error(msg)),
        };
        let Some(raw_date) = input["date"].as_str().map(str::trim) else {
            return Ok(ToolOutput::error("Error: missing 'date' parameter"));
        };

        let Some(date) = parse_fuzzy_date(raw_date, Local::now().date_naive()) else {
            return Ok(ToolOutput::error(
                "Sorry, I couldn't understand the date you mentioned.",
            ));
        };

        let orders = match self
            .storage
            .get_orders_by_date(user_id, &date.format("%Y-%m-%d").to_string())
            .await
        {
            Ok(o) => o,
            Err(e) => return Ok(storage_error("retrieving orders", e)),
        };

        if orders.is_empty() {
            return Ok(ToolOutput::error(format!(
                "There is no order recorded for {raw_date}."
            )));
        }

        let lines: Vec<String> = orders
            .iter()
            .map(|details| {
                format!(
                    "Order ID: {}, Status: {}, Total: ₹{}, Products: {}",
                    details.order.id,
                    details.order.status,
                    format_rupees(details.order.total),
                    items_inline(details)
                )
            })
            .collect();
        Ok(ToolOutput::text(lines.join("\n")))
    }
}

/// Retrieves the user's most recently placed order.
pub struct GetMostRecentOrderTool {
    storage: Arc<dyn StorageAdapter>,
}

impl GetMostRecentOrderTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Tool for GetMostRecentOrderTool {
    fn name(&self) -> &str {
        "get_most_recent_order"
    }

    fn description(&self) -> &str {
        "Retrieve the most recent order for a user, including order details and products"
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

        let details = match self.storage.get_most_recent_order(user_id).await {
            Ok(d) => d,
            Err(e) => return Ok(storage_error("retrieving most recent order", e)),
        };
        let Some(details) = details else {
            return Ok(ToolOutput::error("No recent orders found."));
        };

        Ok(ToolOutput::text(format!(
            "Order ID: {}\nStatus: {}\nDate: {}\nTotal: ₹{}\nProducts: {}",
            details.order.id,
            details.order.status,
            format_timestamp(&details.order.created_at, "%Y-%m-%d %I:%M %p"),
            format_rupees(details.order.total),
            items_inline(&details)
        )))
    }
}

/// Returns the orders page deep link.
pub struct GetMyOrdersUrlTool {
    url: String,
}

impl GetMyOrdersUrlTool {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait]
impl Tool for GetMyOrdersUrlTool {
    fn name(&self) -> &str {
        "get_my_orders_url"
    }

    fn description(&self) -> &str {
        "Returns the URL for the user's orders page"
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
            "You can view all your orders here: {}",
            self.url
        )))
    }
}
