// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Supervisor routing.
//!
//! Decides which sub-agent handles a turn, in three tiers: a pending
//! variation selection forces the cart agent, a keyword fast-path
//! catches obvious shopping queries without a model round-trip, and
//! everything else goes through one classification completion.

use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;
use verdant_core::types::{ContentBlock, ProviderMessage, ProviderRequest};
use verdant_core::{AgentKind, ProviderAdapter, RouteDecision, VerdantError};

/// Classification prompt sent with every supervised turn.
const CLASSIFIER_PROMPT: &str = "You are a supervisor that routes user queries to the appropriate agents.

Available agents:
1. CART_AGENT - For cart operations (add/view/remove items)
2. RESEARCH_AGENT - For plant care, watering, sunlight, soil, diseases
3. RECOMMENDATION_AGENT - For product suggestions (like indoor plants, fertilizers)
4. ORDER_AGENT - For viewing order history or order details

Respond with a comma-separated list (no extra text) of the agent types the query should be routed to:
- cart
- research
- recommendation
- order
For example, respond with: recommendation,research
";

/// Shopping verbs that make a turn a recommendation query on their own.
const RECOMMENDATION_KEYWORDS: [&str; 5] = ["fertilizer", "buy", "recommend", "suggest", "booster"];

/// Routes without a model round-trip when the message form is obvious.
///
/// A turn carrying an image is an identification-and-recommend turn,
/// and a handful of shopping verbs are unambiguous by themselves.
pub fn keyword_route(message: &str, has_image: bool) -> Option<RouteDecision> {
    if has_image {
        return Some(RouteDecision::Single(AgentKind::Recommendation));
    }
    let lowered = message.to_lowercase();
    RECOMMENDATION_KEYWORDS
        .iter()
        .any(|kw| lowered.contains(kw))
        .then_some(RouteDecision::Single(AgentKind::Recommendation))
}

/// Parses the classifier's reply into a routing decision.
///
/// Unrecognized tokens are dropped and duplicates collapsed; an empty
/// result falls back to the research agent so off-catalog questions
/// still get an answer.
pub fn parse_decision(raw: &str) -> RouteDecision {
    let mut kinds: Vec<AgentKind> = Vec::new();
    for token in raw.split(',') {
        let token = token.trim().to_lowercase();
        if let Ok(kind) = AgentKind::from_str(&token) {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
    }
    match kinds.len() {
        0 => RouteDecision::Single(AgentKind::Research),
        1 => RouteDecision::Single(kinds[0]),
        _ => RouteDecision::Multi(kinds),
    }
}

/// Chooses the sub-agent(s) for a turn.
///
/// A pending variation selection always routes to the cart agent so the
/// conversation stays on the interrupted add.
pub async fn classify(
    provider: &Arc<dyn ProviderAdapter>,
    model: &str,
    max_tokens: u32,
    message: &str,
    has_image: bool,
    has_pending_selection: bool,
) -> Result<RouteDecision, VerdantError> {
    if has_pending_selection {
        debug!("pending selection present, routing to cart agent");
        return Ok(RouteDecision::Single(AgentKind::Cart));
    }
    if let Some(decision) = keyword_route(message, has_image) {
        debug!(?decision, "keyword fast-path routing");
        return Ok(decision);
    }

    let request = ProviderRequest {
        model: model.to_string(),
        system_prompt: Some(CLASSIFIER_PROMPT.to_string()),
        messages: vec![ProviderMessage {
            role: "user".to_string(),
            content: vec![ContentBlock::Text {
                text: message.to_string(),
            }],
        }],
        max_tokens,
        tools: None,
    };
    let response = provider.complete(request).await?;
    let reply = response.text();
    let decision = parse_decision(&reply);
    debug!(reply = reply.as_str(), ?decision, "classifier routing");
    Ok(decision)
}
