// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session rate-limit guard.
//!
//! Every turn is counted before any other work happens. Once the
//! counter passes the configured allowance the user only ever gets the
//! canned block reply, until an administrative reset.

use std::sync::Arc;

use tracing::info;
use verdant_core::traits::StorageAdapter;
use verdant_core::VerdantError;

/// The canned reply for a blocked user.
pub fn block_message(limit: i64) -> String {
    format!("You have reached the maximum of {limit} messages and are now blocked from chatting.")
}

/// Counts the turn against the user's allowance.
///
/// Returns the block reply once the counter passes the limit. The
/// increment and the block decision are one atomic storage write, so
/// concurrent turns cannot slip past the cap.
pub async fn admit(
    storage: &Arc<dyn StorageAdapter>,
    user_id: i64,
    limit: i64,
) -> Result<Option<String>, VerdantError> {
    let cap = u32::try_from(limit).unwrap_or(u32::MAX);
    let state = storage.increment_message_count(user_id, cap).await?;
    if state.blocked {
        info!(
            user_id,
            count = state.message_count,
            "user is rate limited"
        );
        return Ok(Some(block_message(limit)));
    }
    Ok(None)
}
