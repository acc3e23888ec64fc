// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user message counters with a durable block flag.
//!
//! The counter survives restarts: a user who hit the cap stays blocked
//! until an administrator resets them, not until the process bounces.

use rusqlite::params;

use verdant_core::VerdantError;

use crate::database::Database;
use crate::models::RateLimitState;

/// Increment the user's message counter, blocking once it exceeds `limit`.
///
/// Increment and block decision happen in one statement on the writer
/// thread, so concurrent sends cannot slip past the cap.
pub async fn increment_message_count(
    db: &Database,
    user_id: i64,
    limit: u32,
) -> Result<RateLimitState, VerdantError> {
    let limit = i64::from(limit);
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO rate_limits (user_id, message_count, blocked)
                 VALUES (?1, 1, CASE WHEN 1 > ?2 THEN 1 ELSE 0 END)
                 ON CONFLICT(user_id) DO UPDATE SET
                     message_count = message_count + 1,
                     blocked = CASE WHEN message_count + 1 > ?2 THEN 1 ELSE blocked END",
                params![user_id, limit],
            )?;
            let state = conn.query_row(
                "SELECT user_id, message_count, blocked FROM rate_limits WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(RateLimitState {
                        user_id: row.get(0)?,
                        message_count: row.get(1)?,
                        blocked: row.get(2)?,
                    })
                },
            )?;
            Ok(state)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Current counter state, if the user has sent anything.
pub async fn get_rate_limit(
    db: &Database,
    user_id: i64,
) -> Result<Option<RateLimitState>, VerdantError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT user_id, message_count, blocked FROM rate_limits WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(RateLimitState {
                        user_id: row.get(0)?,
                        message_count: row.get(1)?,
                        blocked: row.get(2)?,
                    })
                },
            );
            match result {
                Ok(state) => Ok(Some(state)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Administrative reset: zero the counter and unblock the user.
pub async fn reset_rate_limit(db: &Database, user_id: i64) -> Result<(), VerdantError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO rate_limits (user_id, message_count, blocked) VALUES (?1, 0, 0)
                 ON CONFLICT(user_id) DO UPDATE SET message_count = 0, blocked = 0",
                params![user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
