// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image-based plant identification.
//!
//! A turn carrying an image gets one vision completion that either
//! names the plant or gives up. Identification is advisory: every
//! failure, provider errors included, degrades to [`PlantLabel::Unknown`]
//! and the turn proceeds without a plant name.

use std::io::Cursor;
use std::sync::Arc;

use tracing::{debug, warn};
use verdant_core::types::{ContentBlock, ImagePayload, ProviderMessage, ProviderRequest};
use verdant_core::ProviderAdapter;

/// Vision prompt for the identification call.
const IDENTIFY_PROMPT: &str = "Analyze the uploaded image and determine if it contains a plant. If a plant is recognized, respond with only the plant name (no extra text). If the image does not contain a recognizable plant, respond with DON'T KNOW";

/// Longest edge allowed before the image is downscaled.
const MAX_EDGE: u32 = 1024;

/// Phrases the vision model uses when it cannot name a plant.
const UNKNOWN_REPLIES: [&str; 7] = [
    "don't know",
    "dont know",
    "unknown",
    "unclear",
    "can't tell",
    "cannot tell",
    "not sure",
];

/// Outcome of an identification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlantLabel {
    Identified(String),
    Unknown,
}

/// Downscales an image so its longest edge fits the vision limit.
///
/// Oversized images are resized preserving aspect ratio and re-encoded
/// as JPEG; in-bounds images pass through untouched. Decode or encode
/// failures also pass the original through and leave rejection to the
/// provider.
pub fn downscale_for_vision(payload: &ImagePayload) -> ImagePayload {
    let img = match image::load_from_memory(&payload.data) {
        Ok(img) => img,
        Err(e) => {
            warn!(error = %e, "image decode failed, sending original");
            return payload.clone();
        }
    };
    if img.width() <= MAX_EDGE && img.height() <= MAX_EDGE {
        return payload.clone();
    }

    let resized = img.thumbnail(MAX_EDGE, MAX_EDGE);
    let mut buf = Vec::new();
    // JPEG has no alpha channel, so flatten to RGB before encoding.
    let encoded = image::DynamicImage::ImageRgb8(resized.to_rgb8())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg);
    match encoded {
        Ok(()) => {
            debug!(
                from_bytes = payload.data.len(),
                to_bytes = buf.len(),
                "downscaled image for vision"
            );
            ImagePayload {
                data: buf,
                media_type: "image/jpeg".to_string(),
            }
        }
        Err(e) => {
            warn!(error = %e, "image re-encode failed, sending original");
            payload.clone()
        }
    }
}

/// Normalizes the vision reply to a label.
///
/// Only the first line counts; trailing punctuation is stripped. Any
/// of the give-up phrases, anywhere in that line, means unknown.
pub fn normalize_label(raw: &str) -> PlantLabel {
    let first_line = raw.lines().next().unwrap_or("").trim();
    let cleaned = first_line.trim_end_matches(['.', '!', '?']).trim();
    if cleaned.is_empty() {
        return PlantLabel::Unknown;
    }
    let lowered = cleaned.to_lowercase();
    if UNKNOWN_REPLIES.iter().any(|phrase| lowered.contains(phrase)) {
        return PlantLabel::Unknown;
    }
    PlantLabel::Identified(cleaned.to_string())
}

/// Identifies the plant in an uploaded image.
pub async fn identify_plant(
    provider: &Arc<dyn ProviderAdapter>,
    model: &str,
    max_tokens: u32,
    payload: &ImagePayload,
) -> PlantLabel {
    let prepared = downscale_for_vision(payload);
    let encoded = {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&prepared.data)
    };

    let request = ProviderRequest {
        model: model.to_string(),
        system_prompt: Some(IDENTIFY_PROMPT.to_string()),
        messages: vec![ProviderMessage {
            role: "user".to_string(),
            content: vec![ContentBlock::Image {
                media_type: prepared.media_type.clone(),
                data: encoded,
            }],
        }],
        max_tokens,
        tools: None,
    };

    match provider.complete(request).await {
        Ok(response) => {
            let label = normalize_label(&response.text());
            debug!(?label, "plant identification");
            label
        }
        Err(e) => {
            warn!(error = %e, "plant identification failed");
            PlantLabel::Unknown
        }
    }
}

/// Prefixes the user message with the identification outcome.
///
/// The personas key off the literal `Image uploaded:` marker, so the
/// prefix wording is contract, not cosmetics.
pub fn prefix_message(message: &str, label: &PlantLabel) -> String {
    match label {
        PlantLabel::Identified(name) => {
            format!("Image uploaded: Yes. This is a photo of a {name}. {message}")
        }
        PlantLabel::Unknown => format!("Image uploaded: No. {message}"),
    }
}
