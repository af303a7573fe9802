// crates/types/src/groups.rs
//! Group payloads attached to a leader message in the flattened sequence.
//!
//! Groups are recomputed wholesale on every pass; nothing here is updated in
//! place across passes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::result::ResultKind;

// =============================================================================
// Agent task groups (Task tool launch + completion)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub enum AgentTaskStatus {
    Running,
    Completed,
    Error,
}

/// One sub-agent launched by a leader message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct AgentTaskInfo {
    /// `id` of the launching `tool_use` block.
    pub tool_use_id: String,
    pub description: String,
    /// From `subagent_type`, falls back to "Task".
    pub subagent_type: String,
    pub status: AgentTaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    /// UUID of the message that carried the completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct AgentTaskGroup {
    pub leader_uuid: String,
    pub tasks: Vec<AgentTaskInfo>,
    /// Leader plus every completion message.
    pub message_uuids: BTreeSet<String>,
}

// =============================================================================
// Agent progress groups (streamed `agent_progress` records)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub data: serde_json::Value,
    pub timestamp: String,
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct AgentProgressGroup {
    pub leader_uuid: String,
    pub agent_id: String,
    /// Links back to the launching Task `tool_use` block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_tool_use_id: Option<String>,
    /// Arrival order.
    pub entries: Vec<ProgressEntry>,
    pub message_uuids: BTreeSet<String>,
}

// =============================================================================
// Task operation groups (TaskCreate / TaskUpdate / TodoWrite ... bursts)
// =============================================================================

/// Registry entry for a task id, first writer wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Conversation-wide task lookup, keyed by task id.
pub type TaskRegistry = BTreeMap<String, TaskInfo>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct TaskOperation {
    pub tool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<String>,
    pub input: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct TaskOperationGroup {
    pub leader_uuid: String,
    pub operations: Vec<TaskOperation>,
    pub message_uuids: BTreeSet<String>,
}
