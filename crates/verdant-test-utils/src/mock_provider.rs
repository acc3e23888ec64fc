// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured
//! responses, enabling fast, CI-runnable tests without external API calls.
//! Scripted responses may carry tool_use blocks, so the full reasoning
//! loop (complete, run tool, complete again) is exercisable offline.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use verdant_core::VerdantError;
use verdant_core::traits::adapter::PluginAdapter;
use verdant_core::traits::provider::ProviderAdapter;
use verdant_core::types::{
    AdapterType, AssistantBlock, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage,
};

/// Builds a plain text completion with an `end_turn` stop reason.
pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
        content: vec![AssistantBlock::Text {
            text: text.to_string(),
        }],
        model: String::new(),
        stop_reason: Some("end_turn".to_string()),
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 20,
        },
    }
}

/// Builds a completion requesting one tool invocation.
pub fn tool_use_response(name: &str, input: serde_json::Value) -> ProviderResponse {
    ProviderResponse {
        id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
        content: vec![AssistantBlock::ToolUse {
            id: format!("toolu-{}", uuid::Uuid::new_v4()),
            name: name.to_string(),
            input,
        }],
        model: String::new(),
        stop_reason: Some("tool_use".to_string()),
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 20,
        },
    }
}

/// A mock LLM provider that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a
/// default "mock response" text is returned. Every request received is
/// recorded so tests can assert on system prompts and tool definitions.
/// The locks are plain sync mutexes held only for queue pops and vec
/// pushes, never across an await.
pub struct MockProvider {
    responses: Mutex<VecDeque<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock provider pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Add a response to the end of the queue.
    pub fn add_response(&self, response: ProviderResponse) {
        self.responses
            .lock()
            .expect("lock poisoned")
            .push_back(response);
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }

    /// Pop the next response, or return the default.
    fn next_response(&self) -> ProviderResponse {
        self.responses
            .lock()
            .expect("lock poisoned")
            .pop_front()
            .unwrap_or_else(|| text_response("mock response"))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
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
impl ProviderAdapter for MockProvider {
    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> Result<ProviderResponse, VerdantError> {
        let mut response = self.next_response();
        if response.model.is_empty() {
            response.model = request.model.clone();
        }
        self.requests.lock().expect("lock poisoned").push(request);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(system: Option<&str>) -> ProviderRequest {
        ProviderRequest {
            model: "test-model".to_string(),
            system_prompt: system.map(String::from),
            messages: vec![],
            max_tokens: 100,
            tools: None,
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let resp = provider.complete(req(None)).await.unwrap();
        assert_eq!(resp.text(), "mock response");
        assert_eq!(resp.model, "test-model");
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider = MockProvider::with_responses(vec![
            text_response("first"),
            text_response("second"),
        ]);
        assert_eq!(provider.complete(req(None)).await.unwrap().text(), "first");
        assert_eq!(provider.complete(req(None)).await.unwrap().text(), "second");
        // Queue exhausted, falls back to default
        assert_eq!(
            provider.complete(req(None)).await.unwrap().text(),
            "mock response"
        );
    }

    #[tokio::test]
    async fn tool_use_response_carries_invocation() {
        let provider = MockProvider::with_responses(vec![tool_use_response(
            "get_cart_items",
            serde_json::json!({"user_id": 7}),
        )]);
        let resp = provider.complete(req(None)).await.unwrap();
        assert_eq!(resp.stop_reason.as_deref(), Some("tool_use"));
        let uses = resp.tool_uses();
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].1, "get_cart_items");
        assert_eq!(uses[0].2["user_id"], 7);
    }

    #[tokio::test]
    async fn records_received_requests() {
        let provider = MockProvider::new();
        provider.complete(req(Some("classify this"))).await.unwrap();
        provider.complete(req(None)).await.unwrap();

        let seen = provider.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].system_prompt.as_deref(), Some("classify this"));
        assert!(seen[1].system_prompt.is_none());
    }

    #[tokio::test]
    async fn add_response_after_construction() {
        let provider = MockProvider::new();
        provider.add_response(text_response("dynamic"));
        assert_eq!(provider.complete(req(None)).await.unwrap().text(), "dynamic");
    }
}
