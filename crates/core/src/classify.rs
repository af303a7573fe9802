// crates/core/src/classify.rs
//! One-time decode of everything the groupers look at.
//!
//! Each ordered message is inspected once: tool_use blocks, answered
//! tool_use ids, the decoded `toolUseResult`, and agent progress payloads.
//! Groupers only match on these facts.

use serde_json::Value;
use transcript_view_types::{Message, MessageType, ResultKind, ToolUseRef};

use crate::timestamp::parse_timestamp_ms;
use crate::traverse::Visit;

/// Tools that launch a sub-agent.
pub const AGENT_TASK_TOOLS: [&str; 2] = ["Task", "Agent"];

/// Task-board tools grouped into operation bursts.
pub const TASK_TOOLS: [&str; 7] = [
    "TaskCreate",
    "TaskUpdate",
    "TaskGet",
    "TaskList",
    "TaskOutput",
    "TodoWrite",
    "TodoRead",
];

/// `data` of a `progress` record with `data.type == "agent_progress"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentProgressRef<'a> {
    pub agent_id: &'a str,
    pub data: &'a Value,
}

#[derive(Debug, Clone)]
pub struct MessageFacts<'a> {
    pub message: &'a Message,
    pub depth: usize,
    pub timestamp_ms: i64,
    pub result: ResultKind,
    pub tool_uses: Vec<ToolUseRef<'a>>,
    pub tool_result_ids: Vec<&'a str>,
    pub agent_progress: Option<AgentProgressRef<'a>>,
}

impl<'a> MessageFacts<'a> {
    pub fn from_message(message: &'a Message, depth: usize) -> Self {
        let agent_progress = if message.message_type == MessageType::Progress {
            message.data.as_ref().and_then(|data| {
                if data.get("type").and_then(|t| t.as_str()) != Some("agent_progress") {
                    return None;
                }
                let agent_id = data.get("agentId").and_then(|v| v.as_str())?;
                Some(AgentProgressRef { agent_id, data })
            })
        } else {
            None
        };

        Self {
            message,
            depth,
            timestamp_ms: parse_timestamp_ms(&message.timestamp),
            result: message
                .tool_use_result
                .as_ref()
                .map(ResultKind::decode)
                .unwrap_or(ResultKind::None),
            tool_uses: message.tool_uses(),
            tool_result_ids: message.tool_result_ids(),
            agent_progress,
        }
    }

    pub fn uuid(&self) -> &'a str {
        self.message.uuid.as_str()
    }

    /// Sub-agent launches, only on assistant messages.
    pub fn agent_launches(&self) -> impl Iterator<Item = &ToolUseRef<'a>> + '_ {
        let is_assistant = self.message.message_type == MessageType::Assistant;
        self.tool_uses
            .iter()
            .filter(move |t| is_assistant && AGENT_TASK_TOOLS.contains(&t.name))
    }

    /// Task-board invocations, only on assistant messages.
    pub fn task_invocations(&self) -> impl Iterator<Item = &ToolUseRef<'a>> + '_ {
        let is_assistant = self.message.message_type == MessageType::Assistant;
        self.tool_uses
            .iter()
            .filter(move |t| is_assistant && TASK_TOOLS.contains(&t.name))
    }

    /// Task results count on user or assistant records.
    pub fn is_task_result(&self) -> bool {
        matches!(
            self.message.message_type,
            MessageType::User | MessageType::Assistant
        ) && self.result.is_task_result()
    }

    /// Progress and system records never affect task-operation windows.
    pub fn is_window_transparent(&self) -> bool {
        matches!(
            self.message.message_type,
            MessageType::Progress | MessageType::System
        )
    }
}

/// Decode facts for every message in traversal order.
pub fn classify<'a>(messages: &'a [Message], order: &[Visit]) -> Vec<MessageFacts<'a>> {
    order
        .iter()
        .map(|v| MessageFacts::from_message(&messages[v.index], v.depth))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use transcript_view_types::ContentBlock;

    #[test]
    fn test_agent_progress_requires_type_and_agent_id() {
        let good = Message::new("p1", MessageType::Progress)
            .with_data(json!({"type": "agent_progress", "agentId": "abc1234"}));
        let facts = MessageFacts::from_message(&good, 0);
        assert_eq!(facts.agent_progress.map(|p| p.agent_id), Some("abc1234"));

        let hook = Message::new("p2", MessageType::Progress)
            .with_data(json!({"type": "hook_progress", "agentId": "abc1234"}));
        assert!(MessageFacts::from_message(&hook, 0).agent_progress.is_none());

        let no_id = Message::new("p3", MessageType::Progress).with_data(json!({"type": "agent_progress"}));
        assert!(MessageFacts::from_message(&no_id, 0).agent_progress.is_none());

        let not_progress = Message::new("p4", MessageType::User)
            .with_data(json!({"type": "agent_progress", "agentId": "abc1234"}));
        assert!(MessageFacts::from_message(&not_progress, 0).agent_progress.is_none());
    }

    #[test]
    fn test_tool_invocation_filters() {
        let msg = Message::assistant("a", "").with_blocks(vec![
            ContentBlock::ToolUse { id: "t1".into(), name: "Task".into(), input: json!({}) },
            ContentBlock::ToolUse { id: "t2".into(), name: "TaskCreate".into(), input: json!({}) },
            ContentBlock::ToolUse { id: "t3".into(), name: "Read".into(), input: json!({}) },
        ]);
        let facts = MessageFacts::from_message(&msg, 0);
        let launches: Vec<&str> = facts.agent_launches().map(|t| t.id).collect();
        let invocations: Vec<&str> = facts.task_invocations().map(|t| t.id).collect();
        assert_eq!(launches, vec!["t1"]);
        assert_eq!(invocations, vec!["t2"]);
    }

    #[test]
    fn test_user_tool_use_is_not_an_invocation() {
        let msg = Message::user("u", "").with_blocks(vec![ContentBlock::ToolUse {
            id: "t1".into(),
            name: "TaskCreate".into(),
            input: json!({}),
        }]);
        let facts = MessageFacts::from_message(&msg, 0);
        assert_eq!(facts.task_invocations().count(), 0);
    }

    #[test]
    fn test_task_result_decoded_once() {
        let msg = Message::user("u", "").with_tool_use_result(json!({"success": true, "taskId": "3"}));
        let facts = MessageFacts::from_message(&msg, 2);
        assert!(facts.is_task_result());
        assert_eq!(facts.depth, 2);

        let progress = Message::new("p", MessageType::Progress)
            .with_tool_use_result(json!({"success": true, "taskId": "3"}));
        let facts = MessageFacts::from_message(&progress, 0);
        assert!(!facts.is_task_result());
        assert!(facts.is_window_transparent());
    }
}
