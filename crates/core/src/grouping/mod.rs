// crates/core/src/grouping/mod.rs
//! The three groupers, run independently over the same ordered facts.

pub mod agent_progress;
pub mod agent_task;
pub mod task_operation;

use std::collections::HashMap;

use tracing::debug;
use transcript_view_types::TaskRegistry;

pub use agent_progress::{group_agent_progress, AgentProgressGrouping};
pub use agent_task::{group_agent_tasks, AgentTaskGrouping};
pub use task_operation::{build_task_registry, group_task_operations, TaskOperationGrouping};

use crate::classify::MessageFacts;
use crate::config::FlattenConfig;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Groupings {
    pub agent_tasks: AgentTaskGrouping,
    pub agent_progress: AgentProgressGrouping,
    pub task_operations: TaskOperationGrouping,
    pub registry: TaskRegistry,
}

impl Groupings {
    /// True when `uuid` is absorbed into some group without leading one.
    pub fn is_hidden_member(&self, uuid: &str) -> bool {
        !self.is_leader(uuid) && self.leader_of(uuid).is_some()
    }

    pub fn is_leader(&self, uuid: &str) -> bool {
        self.agent_tasks.groups.contains_key(uuid)
            || self.agent_progress.groups.contains_key(uuid)
            || self.task_operations.groups.contains_key(uuid)
    }

    /// Leader of the first group (agent task, agent progress, task
    /// operation) that absorbed `uuid` as a member.
    pub fn leader_of(&self, uuid: &str) -> Option<&str> {
        self.agent_tasks
            .member_to_leader
            .get(uuid)
            .or_else(|| self.agent_progress.member_to_leader.get(uuid))
            .or_else(|| self.task_operations.member_to_leader.get(uuid))
            .map(String::as_str)
    }

    /// Member uuid -> leader uuid across all group kinds. Leaders map to
    /// themselves so any grouped uuid resolves to a card.
    pub fn member_to_leader(&self) -> HashMap<String, String> {
        let mut out: HashMap<String, String> = HashMap::new();
        let leaders = self
            .agent_tasks
            .groups
            .keys()
            .chain(self.agent_progress.groups.keys())
            .chain(self.task_operations.groups.keys());
        for leader in leaders {
            out.insert(leader.clone(), leader.clone());
        }
        let members = self
            .task_operations
            .member_to_leader
            .iter()
            .chain(self.agent_progress.member_to_leader.iter())
            .chain(self.agent_tasks.member_to_leader.iter());
        // Later inserts win, so agent-task membership takes precedence.
        for (member, leader) in members {
            if self.is_leader(member) {
                continue;
            }
            out.insert(member.clone(), leader.clone());
        }
        out
    }
}

pub fn group_all(facts: &[MessageFacts<'_>], config: &FlattenConfig) -> Groupings {
    let agent_tasks = group_agent_tasks(facts);
    let agent_progress = group_agent_progress(facts);
    let registry = build_task_registry(facts);
    let task_operations = group_task_operations(facts, &registry, config.window_ms());

    debug!(
        agent_task_groups = agent_tasks.groups.len(),
        agent_progress_groups = agent_progress.groups.len(),
        task_operation_groups = task_operations.groups.len(),
        registered_tasks = registry.len(),
        "Grouped messages"
    );

    Groupings {
        agent_tasks,
        agent_progress,
        task_operations,
        registry,
    }
}
