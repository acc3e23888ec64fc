// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation-window trimming.
//!
//! Provider calls carry a bounded window of the conversation. Cost is
//! estimated at four characters per token, rounded up, with a flat
//! charge for image blocks. Trimming keeps the newest messages and
//! never lets the window open on a tool result, whose tool_use partner
//! would be missing.

use verdant_core::types::{ContentBlock, ProviderMessage};

/// Flat token charge for an inline image block.
const IMAGE_TOKEN_ESTIMATE: usize = 1600;

/// Estimated token cost of one message.
pub fn estimate_tokens(message: &ProviderMessage) -> usize {
    message
        .content
        .iter()
        .map(|block| match block {
            ContentBlock::Text { text } => text.len().div_ceil(4),
            ContentBlock::Image { .. } => IMAGE_TOKEN_ESTIMATE,
            ContentBlock::ToolUse { name, input, .. } => {
                (name.len() + input.to_string().len()).div_ceil(4)
            }
            ContentBlock::ToolResult { content, .. } => content.len().div_ceil(4),
        })
        .sum()
}

fn contains_tool_result(message: &ProviderMessage) -> bool {
    message
        .content
        .iter()
        .any(|block| matches!(block, ContentBlock::ToolResult { .. }))
}

/// Trims a conversation to the token budget.
///
/// Collects messages newest-first until the budget is spent, then drops
/// leading messages until the window opens on a user message that is
/// not a tool result. The newest message is always kept, even when it
/// alone exceeds the budget.
pub fn trim_messages(messages: &[ProviderMessage], budget_tokens: usize) -> Vec<ProviderMessage> {
    let mut start = messages.len();
    let mut total = 0usize;
    for (idx, message) in messages.iter().enumerate().rev() {
        let cost = estimate_tokens(message);
        if start < messages.len() && total + cost > budget_tokens {
            break;
        }
        total += cost;
        start = idx;
    }

    let mut window: Vec<ProviderMessage> = messages[start..].to_vec();
    while window.len() > 1 {
        let first = &window[0];
        if first.role != "user" || contains_tool_result(first) {
            window.remove(0);
        } else {
            break;
        }
    }
    window
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn user(text: &str) -> ProviderMessage {
        ProviderMessage {
            role: "user".to_string(),
            content: vec![ContentBlock::Text {
                text: text.to_string(),
            }],
        }
    }

    fn assistant(text: &str) -> ProviderMessage {
        ProviderMessage {
            role: "assistant".to_string(),
            content: vec![ContentBlock::Text {
                text: text.to_string(),
            }],
        }
    }

    fn tool_pair(id: &str, arg: &str) -> [ProviderMessage; 2] {
        [
            ProviderMessage {
                role: "assistant".to_string(),
                content: vec![ContentBlock::ToolUse {
                    id: id.to_string(),
                    name: "get_cart_items".to_string(),
                    input: serde_json::json!({ "user_id": arg }),
                }],
            },
            ProviderMessage {
                role: "user".to_string(),
                content: vec![ContentBlock::ToolResult {
                    tool_use_id: id.to_string(),
                    content: "Your cart is empty.".to_string(),
                    is_error: false,
                }],
            },
        ]
    }

    #[test]
    fn estimate_rounds_chars_up() {
        assert_eq!(estimate_tokens(&user("abcd")), 1);
        assert_eq!(estimate_tokens(&user("abcde")), 2);
        assert_eq!(estimate_tokens(&user("")), 0);
    }

    #[test]
    fn estimate_charges_images_flat() {
        let message = ProviderMessage {
            role: "user".to_string(),
            content: vec![ContentBlock::Image {
                media_type: "image/jpeg".to_string(),
                data: "aGVsbG8=".repeat(50_000),
            }],
        };
        assert_eq!(estimate_tokens(&message), IMAGE_TOKEN_ESTIMATE);
    }

    #[test]
    fn trim_keeps_everything_under_budget() {
        let convo = vec![user("hello"), assistant("hi"), user("how are you")];
        let window = trim_messages(&convo, 1000);
        assert_eq!(window, convo);
    }

    #[test]
    fn trim_drops_oldest_first() {
        let convo = vec![
            user(&"a".repeat(400)),
            assistant(&"b".repeat(400)),
            user(&"c".repeat(400)),
        ];
        // Each message is 100 tokens; a 250-token budget fits two, but
        // the leading-drop rule removes the assistant opener.
        let window = trim_messages(&convo, 250);
        assert_eq!(window, vec![user(&"c".repeat(400))]);
    }

    #[test]
    fn trim_always_keeps_the_newest_message() {
        let convo = vec![user(&"x".repeat(4000))];
        let window = trim_messages(&convo, 10);
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn trim_never_opens_on_a_tool_result() {
        let [tool_use, tool_result] = tool_pair("toolu-1", "7");
        let convo = vec![
            user("add a rose"),
            tool_use,
            tool_result,
            user(&"z".repeat(100)),
        ];
        // Budget admits the tool result but not its tool_use partner.
        let window = trim_messages(&convo, 35);
        assert_eq!(window, vec![user(&"z".repeat(100))]);
    }

    #[test]
    fn trim_keeps_complete_tool_pairs() {
        let [tool_use, tool_result] = tool_pair("toolu-1", "7");
        let convo = vec![
            user("add a rose"),
            tool_use.clone(),
            tool_result.clone(),
            user("thanks"),
        ];
        let window = trim_messages(&convo, 1000);
        assert_eq!(window.len(), 4);
        assert_eq!(window[1], tool_use);
        assert_eq!(window[2], tool_result);
    }

    #[test]
    fn trim_empty_input_is_empty() {
        assert!(trim_messages(&[], 100).is_empty());
    }

    fn conversation_strategy() -> impl Strategy<Value = Vec<ProviderMessage>> {
        let chunk = prop_oneof![
            "[a-z ]{1,80}".prop_map(|t| vec![ProviderMessage {
                role: "user".to_string(),
                content: vec![ContentBlock::Text { text: t }],
            }]),
            "[a-z ]{1,80}".prop_map(|t| vec![ProviderMessage {
                role: "assistant".to_string(),
                content: vec![ContentBlock::Text { text: t }],
            }]),
            ("[0-9]{1,4}", "[a-z ]{1,60}").prop_map(|(id, body)| {
                let [tool_use, tool_result] = [
                    ProviderMessage {
                        role: "assistant".to_string(),
                        content: vec![ContentBlock::ToolUse {
                            id: format!("toolu-{id}"),
                            name: "get_cart_items".to_string(),
                            input: serde_json::json!({ "user_id": 7 }),
                        }],
                    },
                    ProviderMessage {
                        role: "user".to_string(),
                        content: vec![ContentBlock::ToolResult {
                            tool_use_id: format!("toolu-{id}"),
                            content: body,
                            is_error: false,
                        }],
                    },
                ];
                vec![tool_use, tool_result]
            }),
        ];
        proptest::collection::vec(chunk, 1..10)
            .prop_map(|chunks| chunks.into_iter().flatten().collect())
    }

    proptest! {
        #[test]
        fn trimmed_window_is_well_formed(
            budget in 5usize..400,
            convo in conversation_strategy(),
        ) {
            let window = trim_messages(&convo, budget);

            // Non-empty, and a contiguous suffix of the input.
            prop_assert!(!window.is_empty());
            let offset = convo.len() - window.len();
            prop_assert_eq!(&convo[offset..], window.as_slice());

            // Opens on a plain user message unless only the newest is left.
            if window.len() > 1 {
                prop_assert_eq!(window[0].role.as_str(), "user");
                prop_assert!(!contains_tool_result(&window[0]));
            }

            // Every tool_use kept has its tool_result successor kept.
            for (idx, message) in window.iter().enumerate() {
                let has_tool_use = message
                    .content
                    .iter()
                    .any(|b| matches!(b, ContentBlock::ToolUse { .. }));
                if has_tool_use {
                    prop_assert!(idx + 1 < window.len());
                    prop_assert!(contains_tool_result(&window[idx + 1]));
                }
            }

            // Within budget whenever more than the newest message is kept.
            if window.len() > 1 {
                let total: usize = window.iter().map(estimate_tokens).sum();
                prop_assert!(total <= budget);
            }
        }
    }
}
