// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles POST /v1/chat, GET /v1/history/{user_id}, POST
//! /v1/clear/{user_id}, POST /v1/limits/{user_id}/reset, and the
//! unauthenticated GET /health.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use verdant_core::types::{ImagePayload, InterruptPayload};
use verdant_core::{TurnRequest, TurnResponse};

use crate::server::AppState;

/// Request body for POST /v1/chat.
#[derive(Debug, Deserialize)]
pub struct ChatTurnBody {
    /// Numeric user identifier. Must be positive.
    pub user_id: i64,
    /// Message text.
    pub message: String,
    /// Optional base64-encoded photo for plant identification.
    #[serde(default)]
    pub image_base64: Option<String>,
    /// MIME type of the photo, e.g. "image/jpeg".
    #[serde(default)]
    pub image_media_type: Option<String>,
    /// Present only when answering a variation interrupt:
    /// category -> chosen value.
    #[serde(default)]
    pub resume_selection: Option<BTreeMap<String, String>>,
}

/// Response body for a completed chat turn.
#[derive(Debug, Serialize)]
pub struct ReplyBody {
    /// The assistant's merged reply.
    pub reply: String,
}

/// Response body for a chat turn suspended on variation selection.
#[derive(Debug, Serialize)]
pub struct InterruptBody {
    /// Always `true`; distinguishes this shape from [`ReplyBody`].
    pub interrupt: bool,
    /// What the client must collect before resuming.
    pub interrupt_payload: InterruptPayload,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthBody {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
}

/// Response body for GET /v1/history/{user_id}.
#[derive(Debug, Serialize)]
pub struct HistoryBody {
    /// Chat messages, oldest first.
    pub messages: Vec<HistoryMessage>,
}

/// One chat message in a history response.
#[derive(Debug, Serialize)]
pub struct HistoryMessage {
    /// Message row id.
    pub id: i64,
    /// "user" or "agent".
    pub role: String,
    /// Message text.
    pub content: String,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

/// Response body for the clear and limit-reset endpoints.
#[derive(Debug, Serialize)]
pub struct StatusBody {
    /// What happened, e.g. "cleared".
    pub status: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error description.
    pub error: String,
}

fn bad_request(error: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error })).into_response()
}

fn storage_unavailable() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "storage unavailable".to_string(),
        }),
    )
        .into_response()
}

/// Decodes the optional inline image into raw bytes.
///
/// The orchestrator works with decoded bytes so it can downscale before
/// re-encoding for the vision model.
fn decode_image(
    image_base64: Option<&str>,
    image_media_type: Option<&str>,
) -> Result<Option<ImagePayload>, String> {
    let Some(encoded) = image_base64 else {
        return Ok(None);
    };
    use base64::Engine;
    let data = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| format!("invalid image_base64: {e}"))?;
    Ok(Some(ImagePayload {
        data,
        media_type: image_media_type.unwrap_or("image/jpeg").to_string(),
    }))
}

/// POST /v1/chat
///
/// Runs one chat turn through the orchestrator. Returns either a final
/// reply or an interrupt payload asking the client to collect a
/// variation selection and call again with `resume_selection`.
pub async fn post_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatTurnBody>,
) -> Response {
    if body.user_id <= 0 {
        return bad_request(format!("invalid user_id: {}", body.user_id));
    }

    let image = match decode_image(
        body.image_base64.as_deref(),
        body.image_media_type.as_deref(),
    ) {
        Ok(image) => image,
        Err(e) => return bad_request(e),
    };

    let request = TurnRequest {
        user_id: body.user_id,
        message: body.message,
        image,
        resume_selection: body.resume_selection,
    };

    match state.orchestrator.handle_message(request).await {
        TurnResponse::Reply(reply) => {
            (StatusCode::OK, Json(ReplyBody { reply })).into_response()
        }
        TurnResponse::Interrupt(payload) => (
            StatusCode::OK,
            Json(InterruptBody {
                interrupt: true,
                interrupt_payload: payload,
            }),
        )
            .into_response(),
    }
}

/// GET /v1/history/{user_id}
///
/// Returns the user's chat thread, oldest first.
pub async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Response {
    match state.storage.get_chat_history(user_id).await {
        Ok(messages) => {
            let messages = messages
                .into_iter()
                .map(|m| HistoryMessage {
                    id: m.id,
                    role: m.role,
                    content: m.content,
                    created_at: m.created_at,
                })
                .collect();
            (StatusCode::OK, Json(HistoryBody { messages })).into_response()
        }
        Err(e) => {
            tracing::error!(user_id, error = %e, "history fetch failed");
            storage_unavailable()
        }
    }
}

/// POST /v1/clear/{user_id}
///
/// Wipes the chat thread and any pending variation selection. The
/// rate-limit counter is deliberately left alone: clearing a thread is
/// a user action, unblocking is an admin action.
pub async fn post_clear(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Response {
    if let Err(e) = state.storage.clear_chat_history(user_id).await {
        tracing::error!(user_id, error = %e, "chat clear failed");
        return storage_unavailable();
    }
    if let Err(e) = state.storage.clear_pending_selection(user_id).await {
        tracing::error!(user_id, error = %e, "pending-selection clear failed");
        return storage_unavailable();
    }
    tracing::info!(user_id, "chat thread cleared");
    (
        StatusCode::OK,
        Json(StatusBody {
            status: "cleared".to_string(),
        }),
    )
        .into_response()
}

/// POST /v1/limits/{user_id}/reset
///
/// Administrative reset: zeroes the message counter and unblocks the
/// user.
pub async fn post_limits_reset(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Response {
    match state.storage.reset_rate_limit(user_id).await {
        Ok(()) => {
            tracing::info!(user_id, "rate limit reset");
            (
                StatusCode::OK,
                Json(StatusBody {
                    status: "reset".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(user_id, error = %e, "rate-limit reset failed");
            storage_unavailable()
        }
    }
}

/// GET /health
///
/// Unauthenticated liveness probe reporting version and uptime.
pub async fn get_public_health(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}
