// crates/types/src/result.rs
//! Closed decode of `toolUseResult` payloads.
//!
//! The CLI writes a different `toolUseResult` shape per tool. Grouping only
//! cares about a handful of them, so every payload is classified once into a
//! [`ResultKind`] and the groupers match on the variant instead of probing
//! JSON keys.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Task fields as they appear inside a result payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    /// System-assigned ID ("1", "2", ...). Numeric IDs are normalized to
    /// strings. Some payloads echo a task without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Completion payload of a sub-agent launched via the Task tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct AgentTaskResult {
    /// 7-character short hash, matches `agent-{id}.jsonl`.
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tool_use_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ResultKind {
    /// `{task: {...}}` from TaskCreate / TaskGet / TaskUpdate.
    TaskDetail { task: TaskSnapshot },
    /// `{tasks: [...]}` from TaskList.
    TaskList { tasks: Vec<TaskSnapshot> },
    /// `{success, taskId}` acknowledgement.
    #[serde(rename_all = "camelCase")]
    TaskMutation { success: bool, task_id: String },
    AgentTask(AgentTaskResult),
    None,
}

impl ResultKind {
    /// Classify a raw `toolUseResult`. Shapes that match nothing known decode
    /// to [`ResultKind::None`]; this never fails.
    pub fn decode(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::None;
        };

        if let Some(task) = obj.get("task").and_then(TaskSnapshot::from_value) {
            return Self::TaskDetail { task };
        }

        if let Some(tasks) = obj.get("tasks").and_then(|t| t.as_array()) {
            return Self::TaskList {
                tasks: tasks.iter().filter_map(TaskSnapshot::from_value).collect(),
            };
        }

        if let (Some(success), Some(task_id)) = (
            obj.get("success").and_then(|v| v.as_bool()),
            obj.get("taskId").and_then(id_string),
        ) {
            return Self::TaskMutation { success, task_id };
        }

        if let Some(agent_id) = obj.get("agentId").and_then(|v| v.as_str()) {
            return Self::AgentTask(AgentTaskResult {
                agent_id: agent_id.to_string(),
                status: obj.get("status").and_then(|v| v.as_str()).map(String::from),
                total_duration_ms: obj.get("totalDurationMs").and_then(|v| v.as_u64()),
                total_tool_use_count: obj
                    .get("totalToolUseCount")
                    .and_then(|v| v.as_u64())
                    .map(|v| v as u32),
            });
        }

        Self::None
    }

    pub fn is_task_result(&self) -> bool {
        matches!(
            self,
            Self::TaskDetail { .. } | Self::TaskList { .. } | Self::TaskMutation { .. }
        )
    }

    /// The single task id this result refers to, if any.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::TaskDetail { task } => task.id.as_deref(),
            Self::TaskMutation { task_id, .. } => Some(task_id.as_str()),
            _ => None,
        }
    }
}

impl TaskSnapshot {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: obj.get("id").and_then(id_string),
            subject: obj.get("subject").and_then(|v| v.as_str()).map(String::from),
            description: obj.get("description").and_then(|v| v.as_str()).map(String::from),
            status: obj.get("status").and_then(|v| v.as_str()).map(String::from),
        })
    }
}

/// Task ids show up as both `"3"` and `3` depending on CLI version.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
