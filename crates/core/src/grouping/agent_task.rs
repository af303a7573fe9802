// crates/core/src/grouping/agent_task.rs
//! Sub-agent launches paired with their completions.
//!
//! An assistant message with one or more `Task`/`Agent` tool_use blocks
//! leads a group. A later message answering one of those blocks (by
//! `tool_result.tool_use_id`) joins it as a member. A completion payload
//! that names no launch id attaches to the nearest preceding launch that
//! still has an unmatched task.

use std::collections::{BTreeSet, HashMap};

use transcript_view_types::{AgentTaskGroup, AgentTaskInfo, AgentTaskStatus, ResultKind};

use crate::classify::MessageFacts;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentTaskGrouping {
    /// Keyed by leader uuid.
    pub groups: HashMap<String, AgentTaskGroup>,
    /// Non-leader member uuid -> leader uuid.
    pub member_to_leader: HashMap<String, String>,
}

pub fn group_agent_tasks(facts: &[MessageFacts<'_>]) -> AgentTaskGrouping {
    // Leader uuids in stream order, so "nearest preceding" is a reverse scan.
    let mut leaders: Vec<String> = Vec::new();
    let mut groups: HashMap<String, AgentTaskGroup> = HashMap::new();
    // launch tool_use id -> (leader uuid, task index)
    let mut pending_by_id: HashMap<String, (String, usize)> = HashMap::new();
    let mut member_to_leader: HashMap<String, String> = HashMap::new();

    for fact in facts {
        let uuid = fact.uuid();

        let launches: Vec<AgentTaskInfo> = fact
            .agent_launches()
            .map(|t| AgentTaskInfo {
                tool_use_id: t.id.to_string(),
                description: t
                    .input
                    .get("description")
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string(),
                subagent_type: t
                    .input
                    .get("subagent_type")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Task")
                    .to_string(),
                status: AgentTaskStatus::Running,
                agent_id: None,
                completion_uuid: None,
                duration_ms: None,
                tool_use_count: None,
            })
            .collect();

        if !launches.is_empty() {
            if groups.contains_key(uuid) {
                continue;
            }
            for (i, task) in launches.iter().enumerate() {
                if !task.tool_use_id.is_empty() {
                    pending_by_id.insert(task.tool_use_id.clone(), (uuid.to_string(), i));
                }
            }
            leaders.push(uuid.to_string());
            groups.insert(
                uuid.to_string(),
                AgentTaskGroup {
                    leader_uuid: uuid.to_string(),
                    tasks: launches,
                    message_uuids: BTreeSet::from([uuid.to_string()]),
                },
            );
            continue;
        }

        if member_to_leader.contains_key(uuid) {
            continue;
        }

        let agent_result = match &fact.result {
            ResultKind::AgentTask(r) => Some(r),
            _ => None,
        };

        // Completion by id first.
        let mut target = fact
            .tool_result_ids
            .iter()
            .find_map(|id| pending_by_id.remove(*id));

        // Otherwise an agent completion payload goes to the nearest open launch.
        if target.is_none() && agent_result.is_some() {
            target = leaders.iter().rev().find_map(|leader| {
                let group = groups.get(leader)?;
                let idx = group
                    .tasks
                    .iter()
                    .position(|t| t.completion_uuid.is_none())?;
                Some((leader.clone(), idx))
            });
            if let Some((leader, idx)) = &target {
                if let Some(task) = groups.get(leader).and_then(|g| g.tasks.get(*idx)) {
                    pending_by_id.remove(&task.tool_use_id);
                }
            }
        }

        let Some((leader, idx)) = target else {
            continue;
        };
        let Some(group) = groups.get_mut(&leader) else {
            continue;
        };

        let task = &mut group.tasks[idx];
        task.completion_uuid = Some(uuid.to_string());
        task.status = match agent_result.and_then(|r| r.status.as_deref()) {
            Some("error") | Some("failed") | Some("killed") => AgentTaskStatus::Error,
            _ => AgentTaskStatus::Completed,
        };
        if let Some(r) = agent_result {
            task.agent_id = Some(r.agent_id.clone());
            task.duration_ms = r.total_duration_ms;
            task.tool_use_count = r.total_tool_use_count;
        }
        group.message_uuids.insert(uuid.to_string());
        member_to_leader.insert(uuid.to_string(), leader);
    }

    AgentTaskGrouping {
        groups,
        member_to_leader,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::MessageFacts;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use transcript_view_types::{ContentBlock, Message};

    fn launch(uuid: &str, ids: &[&str]) -> Message {
        Message::assistant(uuid, "").with_blocks(
            ids.iter()
                .map(|id| ContentBlock::ToolUse {
                    id: id.to_string(),
                    name: "Task".into(),
                    input: json!({"description": format!("job {id}"), "subagent_type": "Explore"}),
                })
                .collect(),
        )
    }

    fn completion(uuid: &str, tool_use_id: &str, agent_id: &str) -> Message {
        Message::user(uuid, "")
            .with_blocks(vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                content: Some(json!("done")),
                is_error: None,
            }])
            .with_tool_use_result(json!({"agentId": agent_id, "status": "completed", "totalDurationMs": 900}))
    }

    fn facts(messages: &[Message]) -> Vec<MessageFacts<'_>> {
        messages.iter().map(|m| MessageFacts::from_message(m, 0)).collect()
    }

    #[test]
    fn test_launch_and_completion_by_id() {
        let messages = vec![
            launch("L", &["toolu_1", "toolu_2"]),
            completion("C2", "toolu_2", "bbbbbbb"),
            completion("C1", "toolu_1", "aaaaaaa"),
        ];
        let grouping = group_agent_tasks(&facts(&messages));

        let group = &grouping.groups["L"];
        assert_eq!(group.tasks.len(), 2);
        assert_eq!(group.tasks[0].completion_uuid.as_deref(), Some("C1"));
        assert_eq!(group.tasks[0].agent_id.as_deref(), Some("aaaaaaa"));
        assert_eq!(group.tasks[1].completion_uuid.as_deref(), Some("C2"));
        assert_eq!(group.tasks[1].status, AgentTaskStatus::Completed);
        assert_eq!(group.tasks[1].duration_ms, Some(900));
        assert_eq!(group.tasks[0].subagent_type, "Explore");
        assert_eq!(
            group.message_uuids,
            BTreeSet::from(["L".to_string(), "C1".to_string(), "C2".to_string()])
        );
        assert_eq!(grouping.member_to_leader["C1"], "L");
    }

    #[test]
    fn test_completion_without_id_goes_to_nearest_open_launch() {
        let messages = vec![
            launch("L1", &["toolu_1"]),
            launch("L2", &["toolu_2"]),
            Message::user("C", "").with_tool_use_result(json!({"agentId": "ccccccc", "status": "error"})),
        ];
        let grouping = group_agent_tasks(&facts(&messages));
        assert_eq!(grouping.member_to_leader["C"], "L2");
        assert_eq!(grouping.groups["L2"].tasks[0].status, AgentTaskStatus::Error);
        assert_eq!(grouping.groups["L1"].tasks[0].status, AgentTaskStatus::Running);
    }

    #[test]
    fn test_unrelated_tool_results_are_not_members() {
        let messages = vec![
            launch("L", &["toolu_1"]),
            completion("X", "toolu_other", "zzzzzzz").with_tool_use_result(json!({"stdout": ""})),
        ];
        let grouping = group_agent_tasks(&facts(&messages));
        assert!(grouping.member_to_leader.is_empty());
        assert_eq!(grouping.groups["L"].tasks[0].status, AgentTaskStatus::Running);
    }

    #[test]
    fn test_second_completion_for_same_id_is_ignored() {
        let messages = vec![
            launch("L", &["toolu_1"]),
            completion("C1", "toolu_1", "aaaaaaa"),
            completion("C1b", "toolu_1", "aaaaaaa"),
        ];
        let grouping = group_agent_tasks(&facts(&messages));
        assert_eq!(grouping.member_to_leader.len(), 1);
        assert_eq!(grouping.groups["L"].tasks[0].completion_uuid.as_deref(), Some("C1"));
    }

    #[test]
    fn test_no_launches_no_groups() {
        let messages = vec![Message::user("u", "hi"), Message::assistant("a", "hello")];
        let grouping = group_agent_tasks(&facts(&messages));
        assert_eq!(grouping, AgentTaskGrouping::default());
    }
}
