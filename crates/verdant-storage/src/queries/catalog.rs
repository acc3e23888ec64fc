// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog queries: products and their variations.
//!
//! All name matching is case-insensitive and restricted to available
//! products. Listings are ordered by id ascending so lookups that take
//! "the first match" are deterministic.

use rusqlite::params;

use verdant_core::VerdantError;

use crate::database::Database;
use crate::models::{Product, Variation};

fn row_to_product(row: &rusqlite::Row<'_>) -> Result<Product, rusqlite::Error> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        stock: row.get(4)?,
        is_available: row.get(5)?,
        category: row.get(6)?,
        allowed_variations: row.get(7)?,
        created_at: row.get(8)?,
    })
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock, is_available, category, allowed_variations, created_at";

/// Insert a product. Returns the auto-generated product id.
pub async fn insert_product(db: &Database, product: &Product) -> Result<i64, VerdantError> {
    let product = product.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO products (name, description, price, stock, is_available, category, allowed_variations)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    product.name,
                    product.description,
                    product.price,
                    product.stock,
                    product.is_available,
                    product.category,
                    product.allowed_variations,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a variation row. Returns the auto-generated variation id.
pub async fn insert_variation(db: &Database, variation: &Variation) -> Result<i64, VerdantError> {
    let variation = variation.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO variations (product_id, category, value, is_active, is_default)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    variation.product_id,
                    variation.category,
                    variation.value,
                    variation.is_active,
                    variation.is_default,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Exact case-insensitive name lookup among available products.
pub async fn find_product_exact(db: &Database, name: &str) -> Result<Option<Product>, VerdantError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products
                 WHERE LOWER(name) = LOWER(?1) AND is_available = 1
                 ORDER BY id ASC LIMIT 1"
            ))?;
            let result = stmt.query_row(params![name], row_to_product);
            match result {
                Ok(product) => Ok(Some(product)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Case-insensitive substring lookup among available products, ordered by
/// id ascending.
pub async fn find_products_containing(
    db: &Database,
    fragment: &str,
) -> Result<Vec<Product>, VerdantError> {
    let fragment = fragment.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products
                 WHERE INSTR(LOWER(name), LOWER(?1)) > 0 AND is_available = 1
                 ORDER BY id ASC"
            ))?;
            let products = stmt
                .query_map(params![fragment], row_to_product)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(products)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Available products in a category, ordered by id ascending.
pub async fn get_products_by_category(
    db: &Database,
    category: &str,
) -> Result<Vec<Product>, VerdantError> {
    let category = category.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products
                 WHERE LOWER(category) = LOWER(?1) AND is_available = 1
                 ORDER BY id ASC"
            ))?;
            let products = stmt
                .query_map(params![category], row_to_product)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(products)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active variation rows for a product, grouped by category.
pub async fn get_active_variations(
    db: &Database,
    product_id: i64,
) -> Result<Vec<Variation>, VerdantError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, product_id, category, value, is_active, is_default
                 FROM variations
                 WHERE product_id = ?1 AND is_active = 1
                 ORDER BY category ASC, id ASC",
            )?;
            let variations = stmt
                .query_map(params![product_id], |row| {
                    Ok(Variation {
                        id: row.get(0)?,
                        product_id: row.get(1)?,
                        category: row.get(2)?,
                        value: row.get(3)?,
                        is_active: row.get(4)?,
                        is_default: row.get(5)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(variations)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
