// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Verdant workspace.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
}

/// The four specialist agents a turn can be routed to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Cart,
    Research,
    Recommendation,
    Order,
}

/// The supervisor's routing decision for one turn.
///
/// The deployed policy routes every turn to exactly one agent; the
/// multi-agent form is retained so the merger contract covers both modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Single(AgentKind),
    Multi(Vec<AgentKind>),
}

impl RouteDecision {
    /// The agents selected by this decision, in routing order.
    pub fn agents(&self) -> Vec<AgentKind> {
        match self {
            RouteDecision::Single(kind) => vec![*kind],
            RouteDecision::Multi(kinds) => kinds.clone(),
        }
    }
}

// --- Turn contract types ---

/// An image attached to a chat turn. Lives only for the turn.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Raw image bytes (already base64-decoded at the gateway).
    pub data: Vec<u8>,
    /// MIME type, e.g. "image/jpeg".
    pub media_type: String,
}

/// One inbound chat turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// Numeric user identifier scoping every catalog/cart/order operation.
    pub user_id: i64,
    /// The user's message text.
    pub message: String,
    /// Optional photo for plant identification.
    pub image: Option<ImagePayload>,
    /// Present only when resuming a pending variation selection:
    /// category -> chosen value.
    pub resume_selection: Option<BTreeMap<String, String>>,
}

/// Structured payload returned instead of a reply when a turn is
/// suspended for variation selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptPayload {
    /// Resolved catalog product name the selection applies to.
    pub product_name: String,
    /// Required categories and their allowed values, category-ordered.
    pub variation_options: BTreeMap<String, Vec<String>>,
    /// Human-readable prompt describing what to pick.
    pub prompt_text: String,
}

/// The outcome of one chat turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnResponse {
    /// A final merged reply.
    Reply(String),
    /// The turn is suspended awaiting a variation selection.
    Interrupt(InterruptPayload),
}

// --- Provider types ---

/// A content block inside a conversation message.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// Plain text.
    Text { text: String },
    /// Base64-encoded inline image.
    Image { media_type: String, data: String },
    /// A tool invocation requested by the assistant.
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// The result of a tool invocation, sent back in a user message.
    ToolResult {
        tool_use_id: String,
        content: String,
        is_error: bool,
    },
}

/// A single message in provider conversation format.
///
/// Role is "user" or "assistant"; tool results travel in user messages
/// per the Messages API convention.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderMessage {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

impl ProviderMessage {
    /// A user message holding a single text block.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// An assistant message holding a single text block.
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }
}

/// A tool made available to the model for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// What the tool does, shown to the model.
    pub description: String,
    /// JSON Schema for the tool's input object.
    pub input_schema: serde_json::Value,
}

/// A completion request to an LLM provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Model identifier.
    pub model: String,
    /// Optional system prompt.
    pub system_prompt: Option<String>,
    /// Conversation messages, oldest first.
    pub messages: Vec<ProviderMessage>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Tool definitions the model may invoke.
    pub tools: Option<Vec<ToolDefinition>>,
}

/// A content block in a provider response.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

/// A full response from an LLM provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Provider-assigned response id.
    pub id: String,
    /// Response content blocks in order.
    pub content: Vec<AssistantBlock>,
    /// Model that generated the response.
    pub model: String,
    /// Why generation stopped ("end_turn", "tool_use", ...).
    pub stop_reason: Option<String>,
    /// Token accounting for the call.
    pub usage: TokenUsage,
}

impl ProviderResponse {
    /// All text blocks concatenated in order.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                AssistantBlock::Text { text } => Some(text.as_str()),
                AssistantBlock::ToolUse { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// The tool invocations requested by this response, in order.
    pub fn tool_uses(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        self.content
            .iter()
            .filter_map(|block| match block {
                AssistantBlock::ToolUse { id, name, input } => {
                    Some((id.as_str(), name.as_str(), input))
                }
                AssistantBlock::Text { .. } => None,
            })
            .collect()
    }
}

/// Token usage statistics for one provider call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

// --- Storage model types ---

/// A catalog product row.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    /// Unique name; matched case-insensitively everywhere.
    pub name: String,
    pub description: String,
    /// Price in paise.
    pub price: i64,
    pub stock: i64,
    pub is_available: bool,
    pub category: String,
    /// Comma-separated variation category list, e.g. "size,color".
    /// Empty means the product never requires variation selection.
    pub allowed_variations: String,
    pub created_at: String,
}

impl Product {
    /// Declared variation categories in declaration order, trimmed,
    /// empty entries skipped.
    pub fn declared_variation_categories(&self) -> Vec<String> {
        self.allowed_variations
            .split(',')
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

/// A selectable attribute value for a product.
#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    pub id: i64,
    pub product_id: i64,
    /// Category name, lowercase ("size", "color", "pack").
    pub category: String,
    pub value: String,
    pub is_active: bool,
    pub is_default: bool,
}

/// One cart line for a user. `product_name` is joined in for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub product_name: String,
    /// Resolved variation choices, category -> value. Two lines for the
    /// same product are distinct exactly when these maps differ.
    pub variation_set: BTreeMap<String, String>,
    pub quantity: i64,
    pub created_at: String,
}

/// An order header, immutable once placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    /// Total in paise.
    pub total: i64,
    pub created_at: String,
}

/// A line on an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub order_id: i64,
    pub product_name: String,
    pub quantity: i64,
}

/// An order with its lines, as returned by the order lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// One persisted chat message. Role is "user" or "agent".
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: i64,
    pub user_id: i64,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// The durable record of a suspended variation selection.
///
/// At most one exists per user; it survives process restarts so resume
/// works across requests.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSelection {
    pub user_id: i64,
    pub product_name: String,
    /// Required categories and their active values, category-ordered.
    pub variation_options: BTreeMap<String, Vec<String>>,
    /// Set after the first incomplete resume; a second incomplete resume
    /// abandons the selection instead of re-prompting again.
    pub reprompted: bool,
    pub created_at: String,
}

/// Per-user message counter state for the rate-limit guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitState {
    pub user_id: i64,
    pub message_count: i64,
    pub blocked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn agent_kind_round_trips_through_strings() {
        for kind in [
            AgentKind::Cart,
            AgentKind::Research,
            AgentKind::Recommendation,
            AgentKind::Order,
        ] {
            let s = kind.to_string();
            let parsed = AgentKind::from_str(&s).expect("should parse back");
            assert_eq!(kind, parsed);
        }
        assert_eq!(AgentKind::Cart.to_string(), "cart");
        assert_eq!(AgentKind::Recommendation.to_string(), "recommendation");
    }

    #[test]
    fn route_decision_single_is_one_element_set() {
        let single = RouteDecision::Single(AgentKind::Order);
        assert_eq!(single.agents(), vec![AgentKind::Order]);

        let multi = RouteDecision::Multi(vec![AgentKind::Cart, AgentKind::Research]);
        assert_eq!(
            multi.agents(),
            vec![AgentKind::Cart, AgentKind::Research]
        );
    }

    #[test]
    fn provider_response_text_skips_tool_use_blocks() {
        let resp = ProviderResponse {
            id: "r1".into(),
            content: vec![
                AssistantBlock::Text {
                    text: "Let me check.".into(),
                },
                AssistantBlock::ToolUse {
                    id: "t1".into(),
                    name: "get_cart_items".into(),
                    input: serde_json::json!({"user_id": 7}),
                },
                AssistantBlock::Text { text: " Done.".into() },
            ],
            model: "test".into(),
            stop_reason: Some("tool_use".into()),
            usage: TokenUsage::default(),
        };
        assert_eq!(resp.text(), "Let me check. Done.");
        let uses = resp.tool_uses();
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].1, "get_cart_items");
    }

    #[test]
    fn interrupt_payload_serializes_with_ordered_options() {
        let mut options = BTreeMap::new();
        options.insert("size".to_string(), vec!["small".into(), "large".into()]);
        options.insert("color".to_string(), vec!["red".into()]);
        let payload = InterruptPayload {
            product_name: "Rose".into(),
            variation_options: options,
            prompt_text: "Pick a size and color.".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["product_name"], "Rose");
        assert_eq!(json["variation_options"]["size"][1], "large");
    }

    #[test]
    fn provider_message_helpers_set_roles() {
        let u = ProviderMessage::user_text("hi");
        assert_eq!(u.role, "user");
        let a = ProviderMessage::assistant_text("hello");
        assert_eq!(a.role, "assistant");
    }

    #[test]
    fn declared_variation_categories_normalizes() {
        let mut product = Product {
            id: 1,
            name: "Rose".into(),
            description: String::new(),
            price: 19900,
            stock: 10,
            is_available: true,
            category: "Plants".into(),
            allowed_variations: "Size, color ,".into(),
            created_at: "2026-01-01T00:00:00Z".into(),
        };
        assert_eq!(
            product.declared_variation_categories(),
            vec!["size".to_string(), "color".to_string()]
        );

        product.allowed_variations = String::new();
        assert!(product.declared_variation_categories().is_empty());
    }
}
