// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable chat history, one thread per user.

use rusqlite::params;

use verdant_core::VerdantError;

use crate::database::Database;
use crate::models::ChatMessage;

/// Append a message to the user's thread.
pub async fn append_chat_message(db: &Database, message: &ChatMessage) -> Result<(), VerdantError> {
    let message = message.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO chat_messages (user_id, role, content) VALUES (?1, ?2, ?3)",
                params![message.user_id, message.role, message.content],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Full thread for a user, oldest first.
pub async fn get_chat_history(
    db: &Database,
    user_id: i64,
) -> Result<Vec<ChatMessage>, VerdantError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, role, content, created_at FROM chat_messages
                 WHERE user_id = ?1 ORDER BY id ASC",
            )?;
            let messages = stmt
                .query_map(params![user_id], |row| {
                    Ok(ChatMessage {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        role: row.get(2)?,
                        content: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete the user's whole thread.
pub async fn clear_chat_history(db: &Database, user_id: i64) -> Result<(), VerdantError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM chat_messages WHERE user_id = ?1",
                params![user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
