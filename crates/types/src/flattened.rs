// crates/types/src/flattened.rs
//! The render sequence handed to the virtualized list.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::groups::{AgentProgressGroup, AgentTaskGroup, TaskOperationGroup};
use crate::message::Message;

/// A visible message card plus its group flags.
///
/// Only leaders carry a group payload; the `*_member` flags are set when a
/// leader of one kind is also absorbed into a group of another kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct MessageItem {
    pub message: Message,
    pub depth: usize,
    /// Position among emitted message items only (placeholders not counted).
    pub original_index: usize,

    pub is_group_leader: bool,
    pub is_group_member: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_task_group: Option<AgentTaskGroup>,

    pub is_progress_group_leader: bool,
    pub is_progress_group_member: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_progress_group: Option<AgentProgressGroup>,

    pub is_task_operation_group_leader: bool,
    pub is_task_operation_group_member: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_operation_group: Option<TaskOperationGroup>,
}

impl MessageItem {
    /// A plain card with no group involvement.
    pub fn plain(message: Message, depth: usize, original_index: usize) -> Self {
        Self {
            message,
            depth,
            original_index,
            is_group_leader: false,
            is_group_member: false,
            agent_task_group: None,
            is_progress_group_leader: false,
            is_progress_group_member: false,
            agent_progress_group: None,
            is_task_operation_group_leader: false,
            is_task_operation_group_member: false,
            task_operation_group: None,
        }
    }

    pub fn is_any_leader(&self) -> bool {
        self.is_group_leader || self.is_progress_group_leader || self.is_task_operation_group_leader
    }
}

/// Stand-in for a run of consecutive hidden messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct HiddenPlaceholder {
    pub hidden_count: usize,
    pub hidden_uuids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FlattenedItem {
    Message(MessageItem),
    HiddenPlaceholder(HiddenPlaceholder),
}

impl FlattenedItem {
    pub fn as_message(&self) -> Option<&MessageItem> {
        match self {
            Self::Message(item) => Some(item),
            Self::HiddenPlaceholder(_) => None,
        }
    }

    pub fn as_placeholder(&self) -> Option<&HiddenPlaceholder> {
        match self {
            Self::HiddenPlaceholder(p) => Some(p),
            Self::Message(_) => None,
        }
    }

    /// UUID of the wrapped message; `None` for placeholders.
    pub fn uuid(&self) -> Option<&str> {
        self.as_message().map(|item| item.message.uuid.as_str())
    }
}
