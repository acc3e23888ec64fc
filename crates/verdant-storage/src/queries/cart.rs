// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cart line queries.
//!
//! A cart line is keyed by `(user_id, product_id, variation_set)`. The
//! variation set is stored as a JSON object; set equality is decided on the
//! parsed maps, not the raw text, so key order in stored JSON never splits
//! a line in two.

use std::collections::BTreeMap;

use rusqlite::params;

use verdant_core::VerdantError;

use crate::database::Database;
use crate::models::CartItem;

fn encode_variation_set(set: &BTreeMap<String, String>) -> Result<String, rusqlite::Error> {
    serde_json::to_string(set).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn decode_variation_set(raw: &str) -> Result<BTreeMap<String, String>, rusqlite::Error> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_cart_item(row: &rusqlite::Row<'_>) -> Result<CartItem, rusqlite::Error> {
    let raw: String = row.get(4)?;
    Ok(CartItem {
        id: row.get(0)?,
        user_id: row.get(1)?,
        product_id: row.get(2)?,
        product_name: row.get(3)?,
        variation_set: decode_variation_set(&raw)?,
        quantity: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// All cart lines for a user, oldest line first.
pub async fn list_cart_items(db: &Database, user_id: i64) -> Result<Vec<CartItem>, VerdantError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, product_id, product_name, variation_set, quantity, created_at
                 FROM cart_items WHERE user_id = ?1 ORDER BY id ASC",
            )?;
            let items = stmt
                .query_map(params![user_id], row_to_cart_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Add `delta_qty` to the line matching `(user, product, variation_set)`,
/// creating the line if absent.
///
/// Runs find + update/insert inside one transaction on the single writer
/// thread, so two concurrent adds of the same line merge into one row with
/// the summed quantity instead of racing into duplicates.
pub async fn upsert_cart_item(
    db: &Database,
    user_id: i64,
    product_id: i64,
    variation_set: &BTreeMap<String, String>,
    delta_qty: i64,
) -> Result<(), VerdantError> {
    let variation_set = variation_set.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing_id = {
                let mut stmt = tx.prepare(
                    "SELECT id, variation_set FROM cart_items
                     WHERE user_id = ?1 AND product_id = ?2 ORDER BY id ASC",
                )?;
                let rows = stmt
                    .query_map(params![user_id, product_id], |row| {
                        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                let mut found = None;
                for (id, raw) in rows {
                    if decode_variation_set(&raw)? == variation_set {
                        found = Some(id);
                        break;
                    }
                }
                found
            };

            match existing_id {
                Some(id) => {
                    tx.execute(
                        "UPDATE cart_items SET quantity = quantity + ?1 WHERE id = ?2",
                        params![delta_qty, id],
                    )?;
                }
                None => {
                    let product_name: String = tx.query_row(
                        "SELECT name FROM products WHERE id = ?1",
                        params![product_id],
                        |row| row.get(0),
                    )?;
                    tx.execute(
                        "INSERT INTO cart_items (user_id, product_id, product_name, variation_set, quantity)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            user_id,
                            product_id,
                            product_name,
                            encode_variation_set(&variation_set)?,
                            delta_qty,
                        ],
                    )?;
                }
            }

            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Remove every cart line whose product name contains `fragment`
/// (case-insensitive). Returns the removed product names in line order.
pub async fn remove_cart_items_matching(
    db: &Database,
    user_id: i64,
    fragment: &str,
) -> Result<Vec<String>, VerdantError> {
    let fragment = fragment.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let removed: Vec<(i64, String)> = {
                let mut stmt = tx.prepare(
                    "SELECT id, product_name FROM cart_items
                     WHERE user_id = ?1 AND INSTR(LOWER(product_name), LOWER(?2)) > 0
                     ORDER BY id ASC",
                )?;
                stmt.query_map(params![user_id, fragment], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?
            };

            for (id, _) in &removed {
                tx.execute("DELETE FROM cart_items WHERE id = ?1", params![id])?;
            }

            tx.commit()?;
            Ok(removed.into_iter().map(|(_, name)| name).collect())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
