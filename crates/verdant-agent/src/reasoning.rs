// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The shared sub-agent reasoning loop.
//!
//! Every sub-agent is the same loop with a different persona and tool
//! registry: complete, run the requested tools, feed the results back,
//! until the model stops asking for tools or the iteration cap is hit.
//! Tool failures come back to the model as error-flagged tool results;
//! only provider failures propagate to the orchestrator.

use std::sync::Arc;

use tracing::{debug, warn};
use verdant_core::types::{AssistantBlock, ContentBlock, ProviderMessage, ProviderRequest, ProviderResponse};
use verdant_core::{ProviderAdapter, VerdantError};
use verdant_tools::{ToolOutput, ToolRegistry, VariationSignal};

use crate::context;

/// Iteration cap for one sub-agent invocation.
const MAX_ITERATIONS: usize = 6;

/// Reply when the loop exhausts its iterations without any final text.
pub const EXHAUSTED_REPLY: &str = "Sorry, I couldn't complete that request. Please try again.";

/// What a sub-agent invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentOutcome {
    /// Final natural-language reply text.
    Reply(String),
    /// The turn must suspend for a variation selection.
    VariationNeeded(VariationSignal),
}

/// Runs one sub-agent to completion.
pub async fn run_agent(
    provider: &Arc<dyn ProviderAdapter>,
    model: &str,
    max_tokens: u32,
    budget_tokens: usize,
    system_prompt: &str,
    mut messages: Vec<ProviderMessage>,
    registry: &ToolRegistry,
) -> Result<AgentOutcome, VerdantError> {
    let mut last_text: Option<String> = None;

    for iteration in 0..MAX_ITERATIONS {
        let window = context::trim_messages(&messages, budget_tokens);
        let request = ProviderRequest {
            model: model.to_string(),
            system_prompt: Some(system_prompt.to_string()),
            messages: window,
            max_tokens,
            tools: Some(registry.tool_definitions()),
        };
        let response = provider.complete(request).await?;

        let text = response.text();
        if !text.trim().is_empty() {
            last_text = Some(text.clone());
        }

        let tool_uses: Vec<(String, String, serde_json::Value)> = response
            .tool_uses()
            .into_iter()
            .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
            .collect();
        if tool_uses.is_empty() {
            debug!(iteration, "agent finished without further tool calls");
            let reply = if text.trim().is_empty() {
                last_text.unwrap_or_else(|| EXHAUSTED_REPLY.to_string())
            } else {
                text
            };
            return Ok(AgentOutcome::Reply(reply));
        }

        messages.push(assistant_message(&response));

        let mut results: Vec<ContentBlock> = Vec::new();
        for (id, name, input) in tool_uses {
            let output = invoke_tool(registry, &name, input).await;
            if output.is_error {
                if let Some(signal) = VariationSignal::decode(&output.content) {
                    debug!(
                        product = signal.product_name.as_str(),
                        "variation signal, suspending turn"
                    );
                    return Ok(AgentOutcome::VariationNeeded(signal));
                }
            }
            results.push(ContentBlock::ToolResult {
                tool_use_id: id,
                content: output.content,
                is_error: output.is_error,
            });
        }
        messages.push(ProviderMessage {
            role: "user".to_string(),
            content: results,
        });
    }

    warn!("reasoning loop hit its iteration cap");
    Ok(AgentOutcome::Reply(
        last_text.unwrap_or_else(|| EXHAUSTED_REPLY.to_string()),
    ))
}

/// Invokes one tool, converting every failure into error-flagged output.
async fn invoke_tool(registry: &ToolRegistry, name: &str, input: serde_json::Value) -> ToolOutput {
    let Some(tool) = registry.get(name) else {
        warn!(tool = name, "model requested an unknown tool");
        return ToolOutput::error(format!("Error: unknown tool '{name}'"));
    };
    match tool.invoke(input).await {
        Ok(output) => output,
        Err(e) => {
            warn!(tool = name, error = %e, "tool invocation failed");
            ToolOutput::error(format!("Error: {e}"))
        }
    }
}

fn assistant_message(response: &ProviderResponse) -> ProviderMessage {
    let content = response
        .content
        .iter()
        .map(|block| match block {
            AssistantBlock::Text { text } => ContentBlock::Text { text: text.clone() },
            AssistantBlock::ToolUse { id, name, input } => ContentBlock::ToolUse {
                id: id.clone(),
                name: name.clone(),
                input: input.clone(),
            },
        })
        .collect();
    ProviderMessage {
        role: "assistant".to_string(),
        content,
    }
}
