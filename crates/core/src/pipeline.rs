// crates/core/src/pipeline.rs
//! End-to-end driver: raw messages in, render sequence plus lookups out.
//!
//! dedup -> command merge -> tree -> traverse -> classify -> group ->
//! flatten -> index. Every stage is a pure function of its inputs; the
//! whole pipeline is re-run whenever messages or the hidden set change.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;
use transcript_view_types::{
    AgentProgressGroup, AgentTaskGroup, FlattenedItem, Message, TaskOperationGroup, TaskRegistry,
};

use crate::classify::classify;
use crate::command_merge::merge_command_outputs;
use crate::config::FlattenConfig;
use crate::dedup::dedupe_messages;
use crate::flatten::flatten_with_placeholders;
use crate::grouping::{group_all, Groupings};
use crate::index::{build_uuid_to_index, find_group_leader_index, find_placeholder_index};
use crate::traverse::{traverse, CycleEdge};
use crate::tree::MessageTree;

/// Every group computed for the conversation, keyed by leader uuid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct ConversationGroups {
    pub agent_tasks: HashMap<String, AgentTaskGroup>,
    pub agent_progress: HashMap<String, AgentProgressGroup>,
    pub task_operations: HashMap<String, TaskOperationGroup>,
    pub task_registry: TaskRegistry,
}

impl From<Groupings> for ConversationGroups {
    fn from(g: Groupings) -> Self {
        Self {
            agent_tasks: g.agent_tasks.groups,
            agent_progress: g.agent_progress.groups,
            task_operations: g.task_operations.groups,
            task_registry: g.registry,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct PipelineDiagnostics {
    pub duplicates_removed: usize,
    pub merged_command_outputs: usize,
    pub cycles: Vec<CycleEdge>,
    pub recovered_orphans: usize,
    pub fallback_triggered: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct FlattenedConversation {
    pub items: Vec<FlattenedItem>,
    pub uuid_to_index: HashMap<String, usize>,
    pub groups: ConversationGroups,
    /// Grouped uuid -> leader uuid; leaders map to themselves.
    pub member_to_leader: HashMap<String, String>,
    pub diagnostics: PipelineDiagnostics,
}

impl FlattenedConversation {
    pub fn index_of(&self, uuid: &str) -> Option<usize> {
        self.uuid_to_index.get(uuid).copied()
    }

    pub fn find_group_leader_index(&self, uuid: &str) -> Option<usize> {
        find_group_leader_index(uuid, &self.member_to_leader, &self.uuid_to_index)
    }

    /// Where to scroll to show `uuid`: its own card, else its group's card,
    /// else the placeholder hiding it (or hiding its leader).
    pub fn scroll_index_for(&self, uuid: &str) -> Option<usize> {
        if let Some(idx) = self.index_of(uuid) {
            return Some(idx);
        }
        if let Some(idx) = self.find_group_leader_index(uuid) {
            return Some(idx);
        }
        find_placeholder_index(&self.items, uuid).or_else(|| {
            let leader = self.member_to_leader.get(uuid)?;
            find_placeholder_index(&self.items, leader)
        })
    }

    /// Number of message cards (placeholders excluded).
    pub fn message_count(&self) -> usize {
        self.uuid_to_index.len()
    }
}

/// Run the whole pipeline.
pub fn flatten_conversation(
    messages: Vec<Message>,
    hidden: &HashSet<String>,
    config: &FlattenConfig,
) -> FlattenedConversation {
    let input_len = messages.len();
    let (messages, duplicates_removed) = dedupe_messages(messages);
    let (messages, merged_command_outputs) = merge_command_outputs(messages);

    let tree = MessageTree::build(&messages);
    let traversal = traverse(&tree, config.orphan_recovery_threshold);
    let facts = classify(&messages, &traversal.order);
    let groupings = group_all(&facts, config);
    let items = flatten_with_placeholders(&facts, &groupings, hidden);

    let uuid_to_index = build_uuid_to_index(&items);
    let member_to_leader = groupings.member_to_leader();

    debug!(
        input = input_len,
        ordered = traversal.order.len(),
        items = items.len(),
        "Flattened conversation"
    );

    FlattenedConversation {
        items,
        uuid_to_index,
        groups: groupings.into(),
        member_to_leader,
        diagnostics: PipelineDiagnostics {
            duplicates_removed,
            merged_command_outputs,
            cycles: traversal.cycles,
            recovered_orphans: traversal.recovered,
            fallback_triggered: traversal.fallback_triggered,
        },
    }
}
