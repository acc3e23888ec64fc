// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The variation-selection suspend/resume protocol.
//!
//! When `add_to_cart` signals that a product needs a variation choice,
//! the turn suspends: the caller gets an [`InterruptPayload`] and a
//! durable [`PendingSelection`] row is written so the resume can happen
//! in a later request, or after a process restart. One re-prompt is
//! allowed for an incomplete resume; a second incomplete resume
//! abandons the selection.

use std::collections::BTreeMap;
use std::fmt;

use verdant_core::types::{InterruptPayload, PendingSelection};
use verdant_tools::VariationSignal;

/// Lifecycle of one orchestrated turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Running,
    AwaitingVariationInput,
    Completed,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TurnState::Running => "running",
            TurnState::AwaitingVariationInput => "awaiting_variation_input",
            TurnState::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Builds the user-facing prompt for a variation interrupt.
pub fn selection_prompt(product_name: &str, options: &BTreeMap<String, Vec<String>>) -> String {
    let lines: Vec<String> = options
        .iter()
        .map(|(category, values)| format!("- {}: {}", category, values.join(", ")))
        .collect();
    format!(
        "Please choose the following options for '{}':\n{}",
        product_name,
        lines.join("\n")
    )
}

/// The payload returned to the caller when a turn suspends.
pub fn interrupt_payload(signal: &VariationSignal) -> InterruptPayload {
    InterruptPayload {
        product_name: signal.product_name.clone(),
        variation_options: signal.variation_options.clone(),
        prompt_text: selection_prompt(&signal.product_name, &signal.variation_options),
    }
}

/// The payload for a re-prompt, rebuilt from the stored checkpoint.
pub fn interrupt_payload_from_pending(pending: &PendingSelection) -> InterruptPayload {
    InterruptPayload {
        product_name: pending.product_name.clone(),
        variation_options: pending.variation_options.clone(),
        prompt_text: selection_prompt(&pending.product_name, &pending.variation_options),
    }
}

/// The durable checkpoint row for a freshly suspended selection.
pub fn pending_from_signal(user_id: i64, signal: &VariationSignal) -> PendingSelection {
    PendingSelection {
        user_id,
        product_name: signal.product_name.clone(),
        variation_options: signal.variation_options.clone(),
        reprompted: false,
        created_at: String::new(),
    }
}

/// Formats the user's structured resume selection for the chat record.
pub fn selection_summary(selection: &BTreeMap<String, String>) -> String {
    if selection.is_empty() {
        return "Selected: nothing".to_string();
    }
    let parts: Vec<String> = selection
        .iter()
        .map(|(category, value)| format!("{category}: {value}"))
        .collect();
    format!("Selected: {}", parts.join(", "))
}

/// Reply sent when a selection is abandoned after the single re-prompt.
pub fn abandon_reply(product_name: &str, missing: &[String]) -> String {
    format!(
        "Sorry, I couldn't complete your selection for '{}' because a choice for {} is still missing. Please try adding the product to your cart again.",
        product_name,
        missing.join(", ")
    )
}
