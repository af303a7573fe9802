// crates/core/src/flatten.rs
//! Ordered facts + group memberships + hidden set -> render sequence.

use std::collections::HashSet;

use transcript_view_types::{FlattenedItem, HiddenPlaceholder, MessageItem};

use crate::classify::MessageFacts;
use crate::grouping::Groupings;

/// Emit one card per visible, ungrouped (or leading) message and collapse
/// each run of consecutive hidden messages into a single placeholder.
///
/// Group members are skipped before the hidden check, so they neither open
/// nor interrupt a hidden run.
pub fn flatten_with_placeholders(
    facts: &[MessageFacts<'_>],
    groupings: &Groupings,
    hidden: &HashSet<String>,
) -> Vec<FlattenedItem> {
    let mut items: Vec<FlattenedItem> = Vec::with_capacity(facts.len());
    let mut hidden_run: Vec<String> = Vec::new();
    let mut emitted = 0usize;

    for fact in facts {
        let uuid = fact.uuid();
        if groupings.is_hidden_member(uuid) {
            continue;
        }
        if hidden.contains(uuid) {
            hidden_run.push(uuid.to_string());
            continue;
        }
        flush_hidden(&mut items, &mut hidden_run);
        items.push(FlattenedItem::Message(message_item(fact, groupings, emitted)));
        emitted += 1;
    }
    flush_hidden(&mut items, &mut hidden_run);

    items
}

fn flush_hidden(items: &mut Vec<FlattenedItem>, run: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let hidden_uuids = std::mem::take(run);
    items.push(FlattenedItem::HiddenPlaceholder(HiddenPlaceholder {
        hidden_count: hidden_uuids.len(),
        hidden_uuids,
    }));
}

fn message_item(fact: &MessageFacts<'_>, groupings: &Groupings, original_index: usize) -> MessageItem {
    let uuid = fact.uuid();
    let mut item = MessageItem::plain(fact.message.clone(), fact.depth, original_index);

    item.agent_task_group = groupings.agent_tasks.groups.get(uuid).cloned();
    item.is_group_leader = item.agent_task_group.is_some();
    item.is_group_member = groupings.agent_tasks.member_to_leader.contains_key(uuid);

    item.agent_progress_group = groupings.agent_progress.groups.get(uuid).cloned();
    item.is_progress_group_leader = item.agent_progress_group.is_some();
    item.is_progress_group_member = groupings.agent_progress.member_to_leader.contains_key(uuid);

    item.task_operation_group = groupings.task_operations.groups.get(uuid).cloned();
    item.is_task_operation_group_leader = item.task_operation_group.is_some();
    item.is_task_operation_group_member =
        groupings.task_operations.member_to_leader.contains_key(uuid);

    item
}
