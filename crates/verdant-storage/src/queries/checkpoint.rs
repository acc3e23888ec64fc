// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pending variation selection checkpoints.
//!
//! At most one selection per user (user_id is the primary key). The row
//! survives restarts: a user who was asked "which color?" can answer after
//! the process has been bounced and still resume the interrupted add.

use std::collections::BTreeMap;

use rusqlite::params;

use verdant_core::VerdantError;

use crate::database::Database;
use crate::models::PendingSelection;

fn encode_options(options: &BTreeMap<String, Vec<String>>) -> Result<String, rusqlite::Error> {
    serde_json::to_string(options)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn decode_options(raw: &str) -> Result<BTreeMap<String, Vec<String>>, rusqlite::Error> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// The user's pending selection, if any.
pub async fn get_pending_selection(
    db: &Database,
    user_id: i64,
) -> Result<Option<PendingSelection>, VerdantError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, product_name, variation_options, reprompted, created_at
                 FROM pending_selections WHERE user_id = ?1",
            )?;
            let result = stmt.query_row(params![user_id], |row| {
                let raw: String = row.get(2)?;
                Ok(PendingSelection {
                    user_id: row.get(0)?,
                    product_name: row.get(1)?,
                    variation_options: decode_options(&raw)?,
                    reprompted: row.get(3)?,
                    created_at: row.get(4)?,
                })
            });
            match result {
                Ok(selection) => Ok(Some(selection)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Store the pending selection, replacing any existing one.
pub async fn set_pending_selection(
    db: &Database,
    selection: &PendingSelection,
) -> Result<(), VerdantError> {
    let selection = selection.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO pending_selections
                 (user_id, product_name, variation_options, reprompted)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    selection.user_id,
                    selection.product_name,
                    encode_options(&selection.variation_options)?,
                    selection.reprompted,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark the selection as having been re-prompted once.
pub async fn mark_selection_reprompted(db: &Database, user_id: i64) -> Result<(), VerdantError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE pending_selections SET reprompted = 1 WHERE user_id = ?1",
                params![user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Clear the pending selection.
pub async fn clear_pending_selection(db: &Database, user_id: i64) -> Result<(), VerdantError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM pending_selections WHERE user_id = ?1",
                params![user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_selection(user_id: i64, product: &str) -> PendingSelection {
        let mut options = BTreeMap::new();
        options.insert(
            "color".to_string(),
            vec!["Red".to_string(), "White".to_string()],
        );
        options.insert("size".to_string(), vec!["Small".to_string()]);
        PendingSelection {
            user_id,
            product_name: product.to_string(),
            variation_options: options,
            reprompted: false,
            created_at: String::new(),
        }
    }

    #[tokio::test]
    async fn set_and_get_roundtrips_options() {
        let (db, _dir) = setup_db().await;
        set_pending_selection(&db, &make_selection(4, "Rose Plant"))
            .await
            .unwrap();

        let got = get_pending_selection(&db, 4).await.unwrap().unwrap();
        assert_eq!(got.product_name, "Rose Plant");
        assert_eq!(got.variation_options["color"], vec!["Red", "White"]);
        assert!(!got.reprompted);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn second_set_replaces_first() {
        let (db, _dir) = setup_db().await;
        set_pending_selection(&db, &make_selection(4, "Rose Plant"))
            .await
            .unwrap();
        set_pending_selection(&db, &make_selection(4, "Tulip Bulbs"))
            .await
            .unwrap();

        let got = get_pending_selection(&db, 4).await.unwrap().unwrap();
        assert_eq!(got.product_name, "Tulip Bulbs");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reprompted_flag_persists() {
        let (db, _dir) = setup_db().await;
        set_pending_selection(&db, &make_selection(4, "Rose Plant"))
            .await
            .unwrap();
        mark_selection_reprompted(&db, 4).await.unwrap();

        let got = get_pending_selection(&db, 4).await.unwrap().unwrap();
        assert!(got.reprompted);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn clear_removes_selection() {
        let (db, _dir) = setup_db().await;
        set_pending_selection(&db, &make_selection(4, "Rose Plant"))
            .await
            .unwrap();
        clear_pending_selection(&db, 4).await.unwrap();

        assert!(get_pending_selection(&db, 4).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_selection_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_pending_selection(&db, 123).await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
