// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order queries.
//!
//! The assistant only reads orders; inserts exist for seeding and for the
//! store backend. Every lookup is scoped by `user_id` so one user can never
//! read another user's orders, whatever id they ask about.

use rusqlite::params;

use verdant_core::VerdantError;

use crate::database::Database;
use crate::models::{Order, OrderDetails, OrderItem};

fn row_to_order(row: &rusqlite::Row<'_>) -> Result<Order, rusqlite::Error> {
    Ok(Order {
        id: row.get(0)?,
        user_id: row.get(1)?,
        status: row.get(2)?,
        total: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn load_order_items(
    conn: &rusqlite::Connection,
    order_id: i64,
) -> Result<Vec<OrderItem>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT order_id, product_name, quantity FROM order_items
         WHERE order_id = ?1 ORDER BY id ASC",
    )?;
    let items = stmt
        .query_map(params![order_id], |row| {
            Ok(OrderItem {
                order_id: row.get(0)?,
                product_name: row.get(1)?,
                quantity: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

/// Insert an order with its line items. Returns the order id.
///
/// An empty `created_at` takes the database timestamp; a non-empty one is
/// stored as given so order history can be seeded on specific dates.
pub async fn insert_order(
    db: &Database,
    order: &Order,
    items: &[OrderItem],
) -> Result<i64, VerdantError> {
    let order = order.clone();
    let items = items.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO orders (user_id, status, total, created_at)
                 VALUES (?1, ?2, ?3, COALESCE(NULLIF(?4, ''), strftime('%Y-%m-%dT%H:%M:%fZ', 'now')))",
                params![order.user_id, order.status, order.total, order.created_at],
            )?;
            let order_id = tx.last_insert_rowid();
            for item in &items {
                tx.execute(
                    "INSERT INTO order_items (order_id, product_name, quantity)
                     VALUES (?1, ?2, ?3)",
                    params![order_id, item.product_name, item.quantity],
                )?;
            }
            tx.commit()?;
            Ok(order_id)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up one of the user's orders by id.
pub async fn get_order(
    db: &Database,
    user_id: i64,
    order_id: i64,
) -> Result<Option<OrderDetails>, VerdantError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, status, total, created_at FROM orders
                 WHERE id = ?1 AND user_id = ?2",
            )?;
            let result = stmt.query_row(params![order_id, user_id], row_to_order);
            match result {
                Ok(order) => {
                    let items = load_order_items(conn, order.id)?;
                    Ok(Some(OrderDetails { order, items }))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The user's orders placed on the given `YYYY-MM-DD` date, oldest first.
pub async fn get_orders_by_date(
    db: &Database,
    user_id: i64,
    date: &str,
) -> Result<Vec<OrderDetails>, VerdantError> {
    let date = date.to_string();
    db.connection()
        .call(move |conn| {
            let orders: Vec<Order> = {
                let mut stmt = conn.prepare(
                    "SELECT id, user_id, status, total, created_at FROM orders
                     WHERE user_id = ?1 AND substr(created_at, 1, 10) = ?2
                     ORDER BY id ASC",
                )?;
                stmt.query_map(params![user_id, date], row_to_order)?
                    .collect::<Result<Vec<_>, _>>()?
            };

            let mut details = Vec::with_capacity(orders.len());
            for order in orders {
                let items = load_order_items(conn, order.id)?;
                details.push(OrderDetails { order, items });
            }
            Ok(details)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The user's most recently placed order.
pub async fn get_most_recent_order(
    db: &Database,
    user_id: i64,
) -> Result<Option<OrderDetails>, VerdantError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, status, total, created_at FROM orders
                 WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT 1",
            )?;
            let result = stmt.query_row(params![user_id], row_to_order);
            match result {
                Ok(order) => {
                    let items = load_order_items(conn, order.id)?;
                    Ok(Some(OrderDetails { order, items }))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
