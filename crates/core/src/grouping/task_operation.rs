// crates/core/src/grouping/task_operation.rs
//! Task-board tool bursts (TaskCreate / TaskUpdate / TodoWrite ...).
//!
//! Two independent passes over the same facts:
//! - [`build_task_registry`]: conversation-wide id -> subject/description,
//!   first writer wins, ignoring group boundaries.
//! - [`group_task_operations`]: time-windowed bursts of invocations with
//!   their results attached.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;
use transcript_view_types::{
    id_string, ResultKind, TaskInfo, TaskOperation, TaskOperationGroup, TaskRegistry, TaskSnapshot,
};

use crate::classify::MessageFacts;

fn str_field(input: &Value, key: &str) -> Option<String> {
    input.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn input_task_id(input: &Value) -> Option<String> {
    input
        .get("taskId")
        .or_else(|| input.get("id"))
        .and_then(id_string)
}

fn register(registry: &mut TaskRegistry, info: TaskInfo) {
    registry.entry(info.id.clone()).or_insert(info);
}

/// Build the registry from every task invocation and every task result.
///
/// A TaskCreate input carries no id; the id arrives in the result. The
/// create's subject/description are held by `tool_use_id` until a result
/// answering that id names the task.
pub fn build_task_registry(facts: &[MessageFacts<'_>]) -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    // TaskCreate tool_use id -> (subject, description)
    let mut pending_creates: HashMap<&str, (Option<String>, Option<String>)> = HashMap::new();

    for fact in facts {
        for invocation in fact.task_invocations() {
            let subject = str_field(invocation.input, "subject");
            let description = str_field(invocation.input, "description");
            match input_task_id(invocation.input) {
                Some(id) => register(
                    &mut registry,
                    TaskInfo {
                        id,
                        subject,
                        description,
                    },
                ),
                None if invocation.name == "TaskCreate" && !invocation.id.is_empty() => {
                    pending_creates.insert(invocation.id, (subject, description));
                }
                None => {}
            }
        }

        if !fact.result.is_task_result() {
            continue;
        }

        let create = fact
            .tool_result_ids
            .iter()
            .find_map(|id| pending_creates.remove(*id));

        match &fact.result {
            ResultKind::TaskDetail { task } => {
                if let Some(info) = info_from_snapshot(task, create) {
                    register(&mut registry, info);
                }
            }
            ResultKind::TaskList { tasks } => {
                for info in tasks.iter().filter_map(|t| info_from_snapshot(t, None)) {
                    register(&mut registry, info);
                }
            }
            ResultKind::TaskMutation { task_id, .. } => {
                if let Some((subject, description)) = create {
                    register(
                        &mut registry,
                        TaskInfo {
                            id: task_id.clone(),
                            subject,
                            description,
                        },
                    );
                }
            }
            ResultKind::AgentTask(_) | ResultKind::None => {}
        }
    }

    registry
}

/// Snapshots without an id cannot be keyed and yield nothing.
fn info_from_snapshot(
    task: &TaskSnapshot,
    create: Option<(Option<String>, Option<String>)>,
) -> Option<TaskInfo> {
    let id = task.id.clone()?;
    let (create_subject, create_description) = create.unwrap_or_default();
    Some(TaskInfo {
        id,
        subject: task.subject.clone().or(create_subject),
        description: task.description.clone().or(create_description),
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskOperationGrouping {
    /// Keyed by leader uuid.
    pub groups: HashMap<String, TaskOperationGroup>,
    pub member_to_leader: HashMap<String, String>,
}

struct OpenGroup {
    leader_uuid: String,
    operations: Vec<TaskOperation>,
    message_uuids: BTreeSet<String>,
    last_timestamp: i64,
    /// Indices into `operations` still waiting for a result.
    pending: Vec<usize>,
}

impl OpenGroup {
    fn within(&self, ts: i64, window_ms: i64) -> bool {
        ts.saturating_sub(self.last_timestamp) <= window_ms
    }
}

/// Walk the stream, opening a group at the first task invocation and
/// closing it once the next relevant event falls outside `window_ms` of the
/// group's last event. Results attach to every pending operation; a result
/// with nothing pending stays a standalone message.
pub fn group_task_operations(
    facts: &[MessageFacts<'_>],
    registry: &TaskRegistry,
    window_ms: i64,
) -> TaskOperationGrouping {
    let mut done: Vec<TaskOperationGroup> = Vec::new();
    let mut current: Option<OpenGroup> = None;

    for fact in facts {
        if fact.is_window_transparent() {
            continue;
        }
        let ts = fact.timestamp_ms;
        let uuid = fact.uuid();

        let operations: Vec<TaskOperation> = fact
            .task_invocations()
            .map(|t| TaskOperation {
                tool_name: t.name.to_string(),
                tool_use_id: (!t.id.is_empty()).then(|| t.id.to_string()),
                input: t.input.clone(),
                result: None,
                task: None,
            })
            .collect();

        if !operations.is_empty() {
            let joins = current.as_ref().is_some_and(|g| g.within(ts, window_ms));
            if !joins {
                if let Some(group) = current.take() {
                    done.push(close(group, registry));
                }
                current = Some(OpenGroup {
                    leader_uuid: uuid.to_string(),
                    operations: Vec::new(),
                    message_uuids: BTreeSet::new(),
                    last_timestamp: ts,
                    pending: Vec::new(),
                });
            }
            if let Some(group) = current.as_mut() {
                for op in operations {
                    group.pending.push(group.operations.len());
                    group.operations.push(op);
                }
                group.message_uuids.insert(uuid.to_string());
                group.last_timestamp = ts;
            }
            continue;
        }

        if !fact.is_task_result() {
            continue;
        }

        let Some(group) = current.as_mut() else {
            continue;
        };
        if !group.within(ts, window_ms) {
            if let Some(group) = current.take() {
                done.push(close(group, registry));
            }
            continue;
        }
        if group.pending.is_empty() {
            continue;
        }
        for idx in group.pending.drain(..) {
            group.operations[idx].result = Some(fact.result.clone());
        }
        group.message_uuids.insert(uuid.to_string());
        group.last_timestamp = ts;
    }

    if let Some(group) = current.take() {
        done.push(close(group, registry));
    }

    let member_to_leader = done
        .iter()
        .flat_map(|g| {
            g.message_uuids
                .iter()
                .filter(|u| **u != g.leader_uuid)
                .map(|u| (u.clone(), g.leader_uuid.clone()))
        })
        .collect();

    TaskOperationGrouping {
        groups: done
            .into_iter()
            .map(|g| (g.leader_uuid.clone(), g))
            .collect(),
        member_to_leader,
    }
}

/// Unresulted operations flush without result data.
fn close(group: OpenGroup, registry: &TaskRegistry) -> TaskOperationGroup {
    let operations = group
        .operations
        .into_iter()
        .map(|mut op| {
            let id = input_task_id(&op.input)
                .or_else(|| op.result.as_ref().and_then(|r| r.task_id().map(String::from)));
            op.task = id.and_then(|id| registry.get(&id).cloned());
            op
        })
        .collect();

    TaskOperationGroup {
        leader_uuid: group.leader_uuid,
        operations,
        message_uuids: group.message_uuids,
    }
}
