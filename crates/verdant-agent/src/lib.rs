// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue orchestration for the Verdant shopping assistant.
//!
//! The [`Orchestrator`] is the central coordinator that:
//! - Gates every turn through the rate-limit guard
//! - Classifies the message and routes it to sub-agents
//! - Runs the shared tool-calling reasoning loop
//! - Suspends and resumes turns for variation selection
//! - Merges sub-agent replies and keeps the chat thread consistent

pub mod agents;
pub mod context;
pub mod guard;
pub mod identify;
pub mod interrupt;
pub mod merger;
pub mod reasoning;
pub mod supervisor;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, error, info, warn};
use verdant_catalog::{CatalogResolver, SelectionCheck};
use verdant_config::model::VerdantConfig;
use verdant_core::types::{ChatMessage, ContentBlock, PendingSelection, Product, ProviderMessage};
use verdant_core::{
    AgentKind, ProviderAdapter, StorageAdapter, TurnRequest, TurnResponse, VerdantError,
};
use verdant_tools::ToolRegistry;

use crate::interrupt::TurnState;
use crate::merger::{Fragment, FragmentSource};
use crate::reasoning::AgentOutcome;

/// Single apologetic reply for any orchestration failure.
pub const APOLOGY_REPLY: &str = "Sorry, there was an error. Please try again.";

/// Reply for a structured resume when nothing is pending.
pub const NO_PENDING_REPLY: &str =
    "There is no pending selection to complete. You can ask me to add a product to your cart first.";

/// The dialogue orchestrator.
///
/// One instance serves every user; turns for the same user are
/// serialized, turns for different users run freely.
pub struct Orchestrator {
    provider: Arc<dyn ProviderAdapter>,
    storage: Arc<dyn StorageAdapter>,
    resolver: CatalogResolver,
    registries: HashMap<AgentKind, Arc<ToolRegistry>>,
    config: VerdantConfig,
    /// Per-user turn serialization; two turns for one user must not
    /// interleave cart writes or checkpoint updates.
    turn_locks: DashMap<i64, Arc<tokio::sync::Mutex<()>>>,
}

impl Orchestrator {
    /// Builds the orchestrator and every sub-agent's tool registry.
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        storage: Arc<dyn StorageAdapter>,
        config: VerdantConfig,
    ) -> Self {
        let registries = agents::build_registries(storage.clone(), &config);
        let resolver = CatalogResolver::new(storage.clone());
        info!(
            agent_name = config.agent.name.as_str(),
            model = config.anthropic.default_model.as_str(),
            "orchestrator initialized"
        );
        Self {
            provider,
            storage,
            resolver,
            registries,
            config,
            turn_locks: DashMap::new(),
        }
    }

    /// Handles one chat turn end to end.
    ///
    /// Never fails outward: a blocked user gets the canned block reply,
    /// and every internal error becomes the generic apology while the
    /// detail goes to the log. The user message and the reply (or the
    /// failure notice) are recorded so the thread stays consistent;
    /// an interrupted turn records only the user message.
    pub async fn handle_message(&self, request: TurnRequest) -> TurnResponse {
        let user_id = request.user_id;
        let lock = self.turn_lock(user_id);
        let _guard = lock.lock().await;

        match guard::admit(&self.storage, user_id, self.config.chat.rate_limit_max).await {
            Ok(Some(block_reply)) => return TurnResponse::Reply(block_reply),
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, user_id, "rate-limit check failed");
                return TurnResponse::Reply(APOLOGY_REPLY.to_string());
            }
        }

        let display_message = self.display_message(&request).await;
        if let Err(e) = self.append_message(user_id, "user", &display_message).await {
            error!(error = %e, user_id, "failed to record user message");
            return TurnResponse::Reply(APOLOGY_REPLY.to_string());
        }

        match self.run_turn(&request, &display_message).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, user_id, "turn failed");
                if let Err(e) = self.append_message(user_id, "agent", APOLOGY_REPLY).await {
                    warn!(error = %e, user_id, "failed to record failure notice");
                }
                TurnResponse::Reply(APOLOGY_REPLY.to_string())
            }
        }
    }

    /// The message text recorded and shown to the model for this turn.
    ///
    /// Resume turns are summarized from the structured selection; image
    /// turns get the identification prefix the personas key off.
    async fn display_message(&self, request: &TurnRequest) -> String {
        if let Some(selection) = &request.resume_selection {
            return interrupt::selection_summary(selection);
        }
        match &request.image {
            Some(image) => {
                let label = identify::identify_plant(
                    &self.provider,
                    &self.config.anthropic.default_model,
                    self.config.anthropic.max_tokens,
                    image,
                )
                .await;
                identify::prefix_message(&request.message, &label)
            }
            None => request.message.clone(),
        }
    }

    async fn run_turn(
        &self,
        request: &TurnRequest,
        display_message: &str,
    ) -> Result<TurnResponse, VerdantError> {
        let pending = self.storage.get_pending_selection(request.user_id).await?;
        if let Some(selection) = &request.resume_selection {
            return self.resume_turn(request.user_id, pending, selection).await;
        }
        self.classify_turn(request, display_message, pending.is_some())
            .await
    }

    /// The ordinary path: classify, run the chosen sub-agents over the
    /// trimmed history, merge their replies.
    async fn classify_turn(
        &self,
        request: &TurnRequest,
        display_message: &str,
        has_pending: bool,
    ) -> Result<TurnResponse, VerdantError> {
        let user_id = request.user_id;
        let model = self.config.anthropic.default_model.as_str();
        let max_tokens = self.config.anthropic.max_tokens;
        let budget = self.config.chat.context_budget_tokens;

        let decision = supervisor::classify(
            &self.provider,
            model,
            max_tokens,
            display_message,
            request.image.is_some(),
            has_pending,
        )
        .await?;
        info!(user_id, ?decision, state = %TurnState::Running, "turn routed");

        let history = self.storage.get_chat_history(user_id).await?;
        let mut window = history_to_messages(&history);
        inject_user_id(&mut window, user_id);
        let window = context::trim_messages(&window, budget);

        let mut fragments = Vec::new();
        for kind in decision.agents() {
            let registry =
                self.registries
                    .get(&kind)
                    .cloned()
                    .ok_or_else(|| VerdantError::Tool {
                        message: format!("no tool registry for agent '{kind}'"),
                    })?;
            let outcome = reasoning::run_agent(
                &self.provider,
                model,
                max_tokens,
                budget,
                agents::persona(kind),
                window.clone(),
                &registry,
            )
            .await?;

            match outcome {
                AgentOutcome::Reply(text) => {
                    fragments.push(Fragment::new(FragmentSource::from(kind), text));
                }
                AgentOutcome::VariationNeeded(signal) => {
                    self.storage
                        .set_pending_selection(&interrupt::pending_from_signal(user_id, &signal))
                        .await?;
                    debug!(
                        user_id,
                        state = %TurnState::AwaitingVariationInput,
                        product = signal.product_name.as_str(),
                        "turn suspended"
                    );
                    return Ok(TurnResponse::Interrupt(interrupt::interrupt_payload(
                        &signal,
                    )));
                }
            }
        }

        let reply = merger::merge(fragments);
        self.append_message(user_id, "agent", &reply).await?;
        if has_pending {
            // The forced-cart turn consumed the interrupted conversation;
            // a stale checkpoint would pin routing to the cart agent.
            self.storage.clear_pending_selection(user_id).await?;
        }
        debug!(user_id, state = %TurnState::Completed, "turn completed");
        Ok(TurnResponse::Reply(reply))
    }

    /// Finalizes a suspended selection without a model round-trip.
    ///
    /// A complete selection is applied directly; an incomplete one is
    /// re-prompted once and abandoned the second time.
    async fn resume_turn(
        &self,
        user_id: i64,
        pending: Option<PendingSelection>,
        selection: &BTreeMap<String, String>,
    ) -> Result<TurnResponse, VerdantError> {
        let Some(pending) = pending else {
            self.append_message(user_id, "agent", NO_PENDING_REPLY)
                .await?;
            return Ok(TurnResponse::Reply(NO_PENDING_REPLY.to_string()));
        };

        // The product can disappear between suspend and resume.
        let Some(resolution) = self.resolver.find_product(&pending.product_name).await? else {
            self.storage.clear_pending_selection(user_id).await?;
            let reply = format!(
                "Sorry, '{}' is no longer available, so I couldn't add it to your cart.",
                pending.product_name
            );
            self.append_message(user_id, "agent", &reply).await?;
            return Ok(TurnResponse::Reply(reply));
        };
        let product = resolution.product;

        match self.resolver.check_selection(&product, selection).await? {
            SelectionCheck::Complete(canonical) => {
                self.storage.clear_pending_selection(user_id).await?;
                let confirmation = self
                    .add_selected_to_cart(user_id, &product, &canonical)
                    .await?;
                self.append_message(user_id, "agent", &confirmation).await?;
                debug!(user_id, state = %TurnState::Completed, "resume completed");
                Ok(TurnResponse::Reply(confirmation))
            }
            SelectionCheck::Missing(missing) => {
                if pending.reprompted {
                    self.storage.clear_pending_selection(user_id).await?;
                    let reply = interrupt::abandon_reply(&product.name, &missing);
                    self.append_message(user_id, "agent", &reply).await?;
                    debug!(user_id, state = %TurnState::Completed, "selection abandoned");
                    Ok(TurnResponse::Reply(reply))
                } else {
                    self.storage.mark_selection_reprompted(user_id).await?;
                    debug!(
                        user_id,
                        state = %TurnState::AwaitingVariationInput,
                        "selection re-prompted"
                    );
                    Ok(TurnResponse::Interrupt(
                        interrupt::interrupt_payload_from_pending(&pending),
                    ))
                }
            }
        }
    }

    /// Applies a completed selection with the same write and wording the
    /// `add_to_cart` tool uses, so a resumed add is indistinguishable
    /// from a direct one.
    async fn add_selected_to_cart(
        &self,
        user_id: i64,
        product: &Product,
        canonical: &BTreeMap<String, String>,
    ) -> Result<String, VerdantError> {
        let existing = self.storage.list_cart_items(user_id).await?;
        let merged = existing
            .iter()
            .any(|item| item.product_id == product.id && item.variation_set == *canonical);
        self.storage
            .upsert_cart_item(user_id, product.id, canonical, 1)
            .await?;
        Ok(if merged {
            format!(
                "Increased quantity of {} with selected variations.",
                product.name
            )
        } else {
            format!("Added {} to cart.", product.name)
        })
    }

    async fn append_message(
        &self,
        user_id: i64,
        role: &str,
        content: &str,
    ) -> Result<(), VerdantError> {
        self.storage
            .append_chat_message(&ChatMessage {
                id: 0,
                user_id,
                role: role.to_string(),
                content: content.to_string(),
                created_at: String::new(),
            })
            .await
    }

    fn turn_lock(&self, user_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        self.turn_locks.entry(user_id).or_default().clone()
    }
}

/// Maps persisted chat records to provider messages. Stored `agent`
/// rows become `assistant` turns; anything else is user input.
fn history_to_messages(history: &[ChatMessage]) -> Vec<ProviderMessage> {
    history
        .iter()
        .map(|m| ProviderMessage {
            role: if m.role == "agent" {
                "assistant".to_string()
            } else {
                "user".to_string()
            },
            content: vec![ContentBlock::Text {
                text: m.content.clone(),
            }],
        })
        .collect()
}

/// Prepends the `User ID:{n}.` marker the tools parse to the newest
/// user message. Older messages stay as recorded.
fn inject_user_id(messages: &mut [ProviderMessage], user_id: i64) {
    if let Some(last) = messages.last_mut() {
        if last.role == "user" {
            if let Some(ContentBlock::Text { text }) = last.content.first_mut() {
                *text = format!("User ID:{user_id}. {text}");
            }
        }
    }
}
