// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The variation-needed side-signal.
//!
//! When `add_to_cart` resolves a product that requires a variation
//! selection the user has not supplied, the tool does not add anything.
//! It returns this signal serialized inside an error-flagged tool result;
//! the reasoning loop decodes it and suspends the turn instead of feeding
//! the result back to the model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tag distinguishing a variation signal from ordinary tool error text.
const SIGNAL_TAG: &str = "variation_required";

/// Structured side-signal carried in an `add_to_cart` error result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationSignal {
    /// Always `"variation_required"`.
    pub signal: String,
    /// Resolved catalog product name the selection applies to.
    pub product_name: String,
    /// Required categories mapped to their active values.
    pub variation_options: BTreeMap<String, Vec<String>>,
}

impl VariationSignal {
    /// Builds a signal for the given product and its required options.
    pub fn new(product_name: String, variation_options: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            signal: SIGNAL_TAG.to_string(),
            product_name,
            variation_options,
        }
    }

    /// Serializes the signal for transport in a tool result.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Attempts to decode a tool result as a variation signal.
    ///
    /// Returns `None` for ordinary error text or JSON carrying a
    /// different tag, so the loop can tell real signals apart from tool
    /// output that merely looks structured.
    pub fn decode(content: &str) -> Option<Self> {
        let parsed: VariationSignal = serde_json::from_str(content).ok()?;
        (parsed.signal == SIGNAL_TAG).then_some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> VariationSignal {
        let mut options = BTreeMap::new();
        options.insert(
            "size".to_string(),
            vec!["small".to_string(), "large".to_string()],
        );
        VariationSignal::new("Rose".to_string(), options)
    }

    #[test]
    fn encode_decode_round_trips() {
        let signal = sample();
        let encoded = signal.encode();
        let decoded = VariationSignal::decode(&encoded).expect("should decode");
        assert_eq!(decoded, signal);
        assert_eq!(decoded.product_name, "Rose");
        assert_eq!(decoded.variation_options["size"], vec!["small", "large"]);
    }

    #[test]
    fn decode_rejects_plain_error_text() {
        assert!(VariationSignal::decode("No product found with name 'rose'.").is_none());
    }

    #[test]
    fn decode_rejects_other_json() {
        let other = r#"{"signal": "something_else", "product_name": "Rose", "variation_options": {}}"#;
        assert!(VariationSignal::decode(other).is_none());
        assert!(VariationSignal::decode(r#"{"reply": "ok"}"#).is_none());
    }
}
