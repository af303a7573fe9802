// crates/core/src/tree.rs
//! Index-based child lists keyed by parent.
//!
//! Nodes are positions in the message slice; edges are `usize` indices, so
//! the traverser never chases references and a parent loop is just data.

use std::collections::HashMap;

use transcript_view_types::Message;

use crate::timestamp::parse_timestamp_ms;

pub struct MessageTree<'a> {
    messages: &'a [Message],
    timestamps: Vec<i64>,
    by_uuid: HashMap<&'a str, usize>,
    /// Children of each parent UUID, including UUIDs absent from the set.
    children: HashMap<&'a str, Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a> MessageTree<'a> {
    /// Build the child index. Each child list (and the root list) is sorted
    /// by parsed timestamp; ties keep input order.
    pub fn build(messages: &'a [Message]) -> Self {
        let timestamps: Vec<i64> = messages
            .iter()
            .map(|m| parse_timestamp_ms(&m.timestamp))
            .collect();
        let by_uuid: HashMap<&str, usize> = messages
            .iter()
            .enumerate()
            .map(|(i, m)| (m.uuid.as_str(), i))
            .collect();

        let mut children: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut roots: Vec<usize> = Vec::new();
        for (i, message) in messages.iter().enumerate() {
            match message.parent_uuid.as_deref() {
                Some(parent) => children.entry(parent).or_default().push(i),
                None => roots.push(i),
            }
        }

        roots.sort_by_key(|&i| timestamps[i]);
        for list in children.values_mut() {
            list.sort_by_key(|&i| timestamps[i]);
        }

        Self {
            messages,
            timestamps,
            by_uuid,
            children,
            roots,
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn message(&self, idx: usize) -> &'a Message {
        &self.messages[idx]
    }

    pub fn timestamp(&self, idx: usize) -> i64 {
        self.timestamps[idx]
    }

    pub fn index_of(&self, uuid: &str) -> Option<usize> {
        self.by_uuid.get(uuid).copied()
    }

    /// Messages with no `parentUuid`, chronological.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn children_of(&self, idx: usize) -> &[usize] {
        self.children
            .get(self.messages[idx].uuid.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the message's `parentUuid` points outside the set.
    pub fn is_orphan(&self, idx: usize) -> bool {
        self.messages[idx]
            .parent_uuid
            .as_deref()
            .is_some_and(|p| !self.by_uuid.contains_key(p))
    }
}
