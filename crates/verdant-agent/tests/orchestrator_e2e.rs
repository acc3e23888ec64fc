// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete orchestration pipeline.
//!
//! Each test builds an isolated orchestrator over temp SQLite and a
//! scripted mock provider. Tests are independent and order-insensitive.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;
use verdant_agent::{Orchestrator, APOLOGY_REPLY, NO_PENDING_REPLY};
use verdant_catalog::CatalogResolver;
use verdant_config::model::VerdantConfig;
use verdant_core::types::{
    AdapterType, ContentBlock, HealthStatus, ImagePayload, ProviderRequest, ProviderResponse,
    TurnRequest, TurnResponse,
};
use verdant_core::{PluginAdapter, ProviderAdapter, StorageAdapter, VerdantError};
use verdant_test_utils::{
    seed_product, seed_variation, temp_storage, text_response, tool_use_response, MockProvider,
};
use verdant_tools::builtin::AddToCartTool;
use verdant_tools::Tool;

async fn orchestrator_with(
    responses: Vec<ProviderResponse>,
) -> (
    Orchestrator,
    Arc<MockProvider>,
    Arc<dyn StorageAdapter>,
    TempDir,
) {
    let (storage, dir) = temp_storage().await.unwrap();
    let mock = Arc::new(MockProvider::with_responses(responses));
    let provider: Arc<dyn ProviderAdapter> = mock.clone();
    let orchestrator = Orchestrator::new(provider, storage.clone(), VerdantConfig::default());
    (orchestrator, mock, storage, dir)
}

fn turn(user_id: i64, message: &str) -> TurnRequest {
    TurnRequest {
        user_id,
        message: message.to_string(),
        image: None,
        resume_selection: None,
    }
}

fn resume(user_id: i64, pairs: &[(&str, &str)]) -> TurnRequest {
    let selection: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    TurnRequest {
        user_id,
        message: String::new(),
        image: None,
        resume_selection: Some(selection),
    }
}

async fn seed_rose(storage: &Arc<dyn StorageAdapter>) -> i64 {
    let id = seed_product(storage, "Rose", 19900, "Plants", "size")
        .await
        .unwrap();
    seed_variation(storage, id, "size", "small", true).await.unwrap();
    seed_variation(storage, id, "size", "large", false)
        .await
        .unwrap();
    id
}

// ---- Test 1: Routed turn end to end ----

#[tokio::test]
async fn test_research_turn_routes_replies_and_persists() {
    let (orchestrator, mock, storage, _dir) = orchestrator_with(vec![
        text_response("research"),
        text_response("Water your rose twice a week."),
    ])
    .await;

    let response = orchestrator
        .handle_message(turn(7, "How often should I water my rose?"))
        .await;

    assert_eq!(
        response,
        TurnResponse::Reply("Water your rose twice a week.".to_string())
    );

    let history = storage.get_chat_history(7).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, "user");
    assert_eq!(history[0].content, "How often should I water my rose?");
    assert_eq!(history[1].role, "agent");
    assert_eq!(history[1].content, "Water your rose twice a week.");

    // Two completions: classifier, then the research agent.
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0]
        .system_prompt
        .as_deref()
        .unwrap()
        .contains("supervisor"));
    assert!(requests[1]
        .system_prompt
        .as_deref()
        .unwrap()
        .contains("plant research assistant"));

    // The newest message carries the user-id marker for the tools.
    let last = requests[1].messages.last().unwrap();
    match &last.content[0] {
        ContentBlock::Text { text } => assert!(text.starts_with("User ID:7. ")),
        other => panic!("unexpected block {other:?}"),
    }
}

// ---- Test 2: Variation interrupt suspends the turn ----

#[tokio::test]
async fn test_variation_interrupt_suspends_and_checkpoints() {
    let (orchestrator, _mock, storage, _dir) = orchestrator_with(vec![
        text_response("cart"),
        tool_use_response("add_to_cart", json!({ "user_id": 7, "product_name": "rose" })),
    ])
    .await;
    seed_rose(&storage).await;

    let response = orchestrator
        .handle_message(turn(7, "Please add a rose to my cart"))
        .await;

    let TurnResponse::Interrupt(payload) = response else {
        panic!("expected an interrupt, got {response:?}");
    };
    assert_eq!(payload.product_name, "Rose");
    assert_eq!(payload.variation_options["size"], vec!["small", "large"]);
    assert!(payload.prompt_text.contains("'Rose'"));

    // Durable checkpoint, no cart write, only the user message recorded.
    let pending = storage.get_pending_selection(7).await.unwrap().unwrap();
    assert_eq!(pending.product_name, "Rose");
    assert!(!pending.reprompted);
    assert!(storage.list_cart_items(7).await.unwrap().is_empty());
    let history = storage.get_chat_history(7).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, "user");
}

// ---- Test 3: Structured resume finalizes without the model ----

#[tokio::test]
async fn test_resume_completes_without_model_round_trip() {
    let (orchestrator, mock, storage, _dir) = orchestrator_with(vec![
        text_response("cart"),
        tool_use_response("add_to_cart", json!({ "user_id": 7, "product_name": "rose" })),
    ])
    .await;
    seed_rose(&storage).await;

    orchestrator
        .handle_message(turn(7, "Please add a rose to my cart"))
        .await;
    let calls_before = mock.requests().len();

    let response = orchestrator
        .handle_message(resume(7, &[("size", "small")]))
        .await;

    assert_eq!(
        response,
        TurnResponse::Reply("Added Rose to cart.".to_string())
    );
    assert_eq!(mock.requests().len(), calls_before);

    let items = storage.list_cart_items(7).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 1);
    assert_eq!(items[0].variation_set["size"], "small");
    assert!(storage.get_pending_selection(7).await.unwrap().is_none());

    let history = storage.get_chat_history(7).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1].content, "Selected: size: small");
    assert_eq!(history[2].content, "Added Rose to cart.");
}

// ---- Test 4: A resumed add matches a direct add ----

#[tokio::test]
async fn test_resumed_add_matches_a_direct_add() {
    let (orchestrator, _mock, storage, _dir) = orchestrator_with(vec![
        text_response("cart"),
        tool_use_response("add_to_cart", json!({ "user_id": 7, "product_name": "rose" })),
    ])
    .await;
    seed_rose(&storage).await;

    orchestrator
        .handle_message(turn(7, "Please add a rose to my cart"))
        .await;
    orchestrator
        .handle_message(resume(7, &[("size", "small")]))
        .await;

    // User 8 adds the same product directly through the tool.
    let resolver = Arc::new(CatalogResolver::new(storage.clone()));
    let tool = AddToCartTool::new(storage.clone(), resolver);
    let out = tool
        .invoke(json!({
            "user_id": 8,
            "product_name": "rose",
            "variations": { "size": "small" }
        }))
        .await
        .unwrap();
    assert_eq!(out.content, "Added Rose to cart.");

    let resumed = &storage.list_cart_items(7).await.unwrap()[0];
    let direct = &storage.list_cart_items(8).await.unwrap()[0];
    assert_eq!(resumed.product_id, direct.product_id);
    assert_eq!(resumed.product_name, direct.product_name);
    assert_eq!(resumed.variation_set, direct.variation_set);
    assert_eq!(resumed.quantity, direct.quantity);
}

// ---- Test 5: Incomplete resume re-prompts once, then abandons ----

#[tokio::test]
async fn test_incomplete_resume_reprompts_once_then_abandons() {
    let (orchestrator, _mock, storage, _dir) = orchestrator_with(vec![
        text_response("cart"),
        tool_use_response("add_to_cart", json!({ "user_id": 7, "product_name": "rose" })),
    ])
    .await;
    seed_rose(&storage).await;

    orchestrator
        .handle_message(turn(7, "Please add a rose to my cart"))
        .await;

    // First incomplete resume: same payload again, flag set.
    let response = orchestrator.handle_message(resume(7, &[])).await;
    let TurnResponse::Interrupt(payload) = response else {
        panic!("expected a re-prompt, got {response:?}");
    };
    assert_eq!(payload.product_name, "Rose");
    assert!(storage
        .get_pending_selection(7)
        .await
        .unwrap()
        .unwrap()
        .reprompted);

    // Second incomplete resume: abandoned, with the missing category named.
    let response = orchestrator.handle_message(resume(7, &[])).await;
    let TurnResponse::Reply(reply) = response else {
        panic!("expected abandonment, got {response:?}");
    };
    assert!(reply.contains("'Rose'"));
    assert!(reply.contains("size"));
    assert!(storage.get_pending_selection(7).await.unwrap().is_none());
    assert!(storage.list_cart_items(7).await.unwrap().is_empty());
}

// ---- Test 6: Unknown variation values are rejected like missing ones ----

#[tokio::test]
async fn test_unknown_variation_value_counts_as_incomplete() {
    let (orchestrator, _mock, storage, _dir) = orchestrator_with(vec![
        text_response("cart"),
        tool_use_response("add_to_cart", json!({ "user_id": 7, "product_name": "rose" })),
    ])
    .await;
    seed_rose(&storage).await;

    orchestrator
        .handle_message(turn(7, "Please add a rose to my cart"))
        .await;

    let response = orchestrator
        .handle_message(resume(7, &[("size", "gigantic")]))
        .await;
    assert!(matches!(response, TurnResponse::Interrupt(_)));
    assert!(storage.list_cart_items(7).await.unwrap().is_empty());
}

// ---- Test 7: Pending selection forces the cart route ----

#[tokio::test]
async fn test_pending_selection_forces_cart_route() {
    let (orchestrator, mock, storage, _dir) = orchestrator_with(vec![
        text_response("cart"),
        tool_use_response("add_to_cart", json!({ "user_id": 7, "product_name": "rose" })),
        tool_use_response(
            "add_to_cart",
            json!({ "user_id": 7, "product_name": "rose", "variations": { "size": "small" } }),
        ),
        text_response("Done! Your small rose is in the cart."),
    ])
    .await;
    seed_rose(&storage).await;

    orchestrator
        .handle_message(turn(7, "Please add a rose to my cart"))
        .await;
    let calls_before = mock.requests().len();

    // A plain text follow-up: no classifier call, straight to the cart
    // agent, which reads the size from the conversation.
    let response = orchestrator.handle_message(turn(7, "small please")).await;
    assert_eq!(
        response,
        TurnResponse::Reply("Done! Your small rose is in the cart.".to_string())
    );

    let requests = mock.requests();
    // Two agent-loop completions, no classification round-trip.
    assert_eq!(requests.len(), calls_before + 2);
    assert!(requests[calls_before]
        .system_prompt
        .as_deref()
        .unwrap()
        .contains("cart management assistant"));

    let items = storage.list_cart_items(7).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].variation_set["size"], "small");

    // The consumed checkpoint does not pin later routing.
    assert!(storage.get_pending_selection(7).await.unwrap().is_none());
}

// ---- Test 8: Multi-label decisions merge in source order ----

#[tokio::test]
async fn test_multi_agent_fragments_merge_in_rank_order() {
    // Routing order is research first; the merger re-ranks cart ahead.
    let (orchestrator, _mock, _storage, _dir) = orchestrator_with(vec![
        text_response("research,cart"),
        text_response("Roses like morning sun."),
        text_response("Your cart holds one rose."),
    ])
    .await;

    let response = orchestrator
        .handle_message(turn(7, "what's in my cart and how much sun do roses need?"))
        .await;

    // Cart ranks before research regardless of routing order.
    assert_eq!(
        response,
        TurnResponse::Reply("Your cart holds one rose.\n\nRoses like morning sun.".to_string())
    );
}

// ---- Test 9: Identified image prefixes the message ----

#[tokio::test]
async fn test_identified_image_prefixes_and_fast_paths() {
    let (orchestrator, mock, storage, _dir) = orchestrator_with(vec![
        text_response("Monstera"),
        text_response("A moss pole would suit your Monstera!"),
    ])
    .await;

    let response = orchestrator
        .handle_message(TurnRequest {
            user_id: 7,
            message: "what should I get for it?".to_string(),
            image: Some(ImagePayload {
                data: vec![0xFF, 0xD8, 0xFF, 0xE0],
                media_type: "image/jpeg".to_string(),
            }),
            resume_selection: None,
        })
        .await;

    assert_eq!(
        response,
        TurnResponse::Reply("A moss pole would suit your Monstera!".to_string())
    );

    // Identification plus one agent loop; images skip the classifier.
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert!(matches!(
        requests[0].messages[0].content[0],
        ContentBlock::Image { .. }
    ));
    assert!(requests[1]
        .system_prompt
        .as_deref()
        .unwrap()
        .contains("recommendation assistant"));

    let history = storage.get_chat_history(7).await.unwrap();
    assert_eq!(
        history[0].content,
        "Image uploaded: Yes. This is a photo of a Monstera. what should I get for it?"
    );
}

// ---- Test 10: Unidentified image still gets a normal turn ----

#[tokio::test]
async fn test_unidentified_image_proceeds_without_error() {
    let (orchestrator, _mock, storage, _dir) = orchestrator_with(vec![
        text_response("DON'T KNOW"),
        text_response("Here are some popular picks for mystery plants!"),
    ])
    .await;

    let response = orchestrator
        .handle_message(TurnRequest {
            user_id: 7,
            message: "what is this plant?".to_string(),
            image: Some(ImagePayload {
                data: vec![1, 2, 3],
                media_type: "image/png".to_string(),
            }),
            resume_selection: None,
        })
        .await;

    assert_eq!(
        response,
        TurnResponse::Reply("Here are some popular picks for mystery plants!".to_string())
    );
    let history = storage.get_chat_history(7).await.unwrap();
    assert_eq!(
        history[0].content,
        "Image uploaded: No. what is this plant?"
    );
}

// ---- Test 11: History feeds later turns until the thread is cleared ----

#[tokio::test]
async fn test_cleared_thread_starts_fresh() {
    let (orchestrator, mock, storage, _dir) = orchestrator_with(vec![
        text_response("research"),
        text_response("Basil loves warmth."),
        text_response("research"),
        text_response("Mist it daily."),
        text_response("research"),
        text_response("Ferns enjoy shade."),
    ])
    .await;

    orchestrator
        .handle_message(turn(7, "how do I grow basil?"))
        .await;
    orchestrator
        .handle_message(turn(7, "and how humid should it be?"))
        .await;

    // Second agent call saw the whole thread so far.
    let requests = mock.requests();
    assert_eq!(requests[3].messages.len(), 3);

    storage.clear_chat_history(7).await.unwrap();
    orchestrator
        .handle_message(turn(7, "what about ferns?"))
        .await;

    let requests = mock.requests();
    assert_eq!(requests[5].messages.len(), 1);
}

// ---- Test 12: Rate limit blocks past the cap ----

#[tokio::test]
async fn test_rate_limit_blocks_after_the_cap() {
    let (storage, _dir) = temp_storage().await.unwrap();
    let mock = Arc::new(MockProvider::with_responses(vec![
        text_response("research"),
        text_response("Reply one."),
        text_response("research"),
        text_response("Reply two."),
    ]));
    let provider: Arc<dyn ProviderAdapter> = mock.clone();
    let mut config = VerdantConfig::default();
    config.chat.rate_limit_max = 2;
    let orchestrator = Orchestrator::new(provider, storage.clone(), config);

    let first = orchestrator.handle_message(turn(7, "hello there")).await;
    assert_eq!(first, TurnResponse::Reply("Reply one.".to_string()));
    let second = orchestrator.handle_message(turn(7, "tell me more")).await;
    assert_eq!(second, TurnResponse::Reply("Reply two.".to_string()));

    let third = orchestrator.handle_message(turn(7, "one more thing")).await;
    assert_eq!(
        third,
        TurnResponse::Reply(
            "You have reached the maximum of 2 messages and are now blocked from chatting."
                .to_string()
        )
    );

    // The blocked turn never reached the provider or the thread.
    assert_eq!(mock.requests().len(), 4);
    assert_eq!(storage.get_chat_history(7).await.unwrap().len(), 4);

    // Still blocked on the next attempt.
    let fourth = orchestrator.handle_message(turn(7, "hello?")).await;
    assert!(matches!(fourth, TurnResponse::Reply(reply) if reply.contains("blocked")));
}

// ---- Test 13: Provider failure turns into the generic apology ----

struct FailingProvider;

#[async_trait]
impl PluginAdapter for FailingProvider {
    fn name(&self) -> &str {
        "failing-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, VerdantError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), VerdantError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for FailingProvider {
    async fn complete(
        &self,
        _request: ProviderRequest,
    ) -> Result<ProviderResponse, VerdantError> {
        Err(VerdantError::Provider {
            message: "upstream unavailable".to_string(),
            source: None,
        })
    }
}

#[tokio::test]
async fn test_provider_failure_becomes_the_apology() {
    let (storage, _dir) = temp_storage().await.unwrap();
    let provider: Arc<dyn ProviderAdapter> = Arc::new(FailingProvider);
    let orchestrator = Orchestrator::new(provider, storage.clone(), VerdantConfig::default());

    let response = orchestrator
        .handle_message(turn(7, "how do I repot a cactus?"))
        .await;

    assert_eq!(response, TurnResponse::Reply(APOLOGY_REPLY.to_string()));

    // The turn still landed in the thread with a failure notice.
    let history = storage.get_chat_history(7).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "how do I repot a cactus?");
    assert_eq!(history[1].role, "agent");
    assert_eq!(history[1].content, APOLOGY_REPLY);
}

// ---- Test 14: Structured resume with nothing pending ----

#[tokio::test]
async fn test_resume_without_pending_selection() {
    let (orchestrator, mock, storage, _dir) = orchestrator_with(vec![]).await;

    let response = orchestrator
        .handle_message(resume(7, &[("size", "small")]))
        .await;

    assert_eq!(response, TurnResponse::Reply(NO_PENDING_REPLY.to_string()));
    assert!(mock.requests().is_empty());
    let history = storage.get_chat_history(7).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "Selected: size: small");
}
