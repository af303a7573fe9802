// crates/core/src/search.rs
//! Search highlight flags passed through to rendering.
//!
//! Matching happens elsewhere; this only answers "is this card a match, and
//! is it the one the cursor is on".

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    pub message_uuid: String,
    /// Occurrence index within the message.
    pub match_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub query: String,
    pub matches: Vec<SearchMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_match_index: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct MessageHighlight {
    pub is_match: bool,
    pub is_current_message: bool,
    /// Occurrence to emphasise inside the current message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_match_index: Option<usize>,
}

impl SearchState {
    pub fn is_active(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// The match the cursor is on, if the index is in range.
    pub fn current_match(&self) -> Option<&SearchMatch> {
        self.current_match_index.and_then(|i| self.matches.get(i))
    }

    pub fn highlight_for(&self, uuid: &str) -> MessageHighlight {
        if !self.is_active() {
            return MessageHighlight::default();
        }
        let is_match = self.matches.iter().any(|m| m.message_uuid == uuid);
        let current = self.current_match().filter(|m| m.message_uuid == uuid);
        MessageHighlight {
            is_match,
            is_current_message: current.is_some(),
            current_match_index: current.map(|m| m.match_index),
        }
    }
}
