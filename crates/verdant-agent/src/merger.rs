// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response merging.
//!
//! Sub-agent replies are combined into one outgoing message. Fragment
//! order is fixed by source rank, not by execution order, so a reply
//! reads the same no matter which agent finished first.

use verdant_core::AgentKind;

/// Reply used when no fragment carries any text.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a proper response.";

/// Where a reply fragment came from. Lower ranks print first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FragmentSource {
    Cart,
    Order,
    Recommendation,
    Research,
    VariationSelection,
}

impl From<AgentKind> for FragmentSource {
    fn from(kind: AgentKind) -> Self {
        match kind {
            AgentKind::Cart => FragmentSource::Cart,
            AgentKind::Order => FragmentSource::Order,
            AgentKind::Recommendation => FragmentSource::Recommendation,
            AgentKind::Research => FragmentSource::Research,
        }
    }
}

/// One sub-agent's contribution to the turn's reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub source: FragmentSource,
    pub text: String,
}

impl Fragment {
    pub fn new(source: FragmentSource, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }
}

/// Merges fragments into the final reply.
///
/// Blank fragments are dropped, the rest sorted by source rank (the
/// sort is stable, so two fragments from one source keep their order)
/// and joined with a blank line. No usable fragment yields the
/// fallback reply.
pub fn merge(mut fragments: Vec<Fragment>) -> String {
    fragments.retain(|f| !f.text.trim().is_empty());
    if fragments.is_empty() {
        return FALLBACK_REPLY.to_string();
    }
    fragments.sort_by_key(|f| f.source);
    fragments
        .iter()
        .map(|f| f.text.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}
