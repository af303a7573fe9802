// crates/core/src/traverse.rs
//! Cycle-safe pre-order traversal of the message tree.
//!
//! Iterative DFS over [`MessageTree`] indices with a shared `visited` set.
//! Root traversal covers well-formed transcripts; anything it cannot reach
//! (orphans from pagination cuts, parent loops) is recovered afterwards,
//! starting from the earliest unvisited message and climbing to its
//! topmost unvisited ancestor so parents still precede children.
//!
//! Only an edge back to a message on the current DFS path is a loop. A
//! message already emitted by an earlier walk is skipped without comment.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::tree::MessageTree;

/// A parent -> child edge that closes a loop of parent references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct CycleEdge {
    pub parent_uuid: String,
    pub uuid: String,
}

/// Position of one message in the traversal output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visit {
    /// Index into the slice the tree was built from.
    pub index: usize,
    pub depth: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Traversal {
    pub order: Vec<Visit>,
    pub cycles: Vec<CycleEdge>,
    /// Messages reached only by recovery.
    pub recovered: usize,
    /// Root traversal reached less than the configured share of messages.
    pub fallback_triggered: bool,
}

/// Walk every message exactly once.
///
/// `threshold` is the share of messages root traversal must reach; below it
/// the recovery is reported as a fallback. Unreached messages are recovered
/// either way so no message is ever dropped.
pub fn traverse(tree: &MessageTree<'_>, threshold: f64) -> Traversal {
    let mut visited: HashSet<usize> = HashSet::with_capacity(tree.len());
    let mut out = Traversal {
        order: Vec::with_capacity(tree.len()),
        ..Default::default()
    };

    for &root in tree.roots() {
        walk(tree, root, &mut visited, &mut out);
    }

    let reached = out.order.len();
    let total = tree.len();
    if reached == total {
        return out;
    }

    out.fallback_triggered = (reached as f64) < threshold * total as f64;
    if out.fallback_triggered {
        warn!(reached, total, "Traversal coverage below threshold, recovering orphaned messages");
    } else {
        debug!(reached, total, "Recovering messages unreachable from roots");
    }

    let mut pending: Vec<usize> = (0..total).filter(|i| !visited.contains(i)).collect();
    pending.sort_by_key(|&i| tree.timestamp(i));
    for idx in pending {
        if visited.contains(&idx) {
            continue;
        }
        let start = recovery_start(tree, idx, &visited);
        if tree.is_orphan(start) {
            debug!(uuid = %tree.message(start).uuid, "Recovering orphaned message");
        }
        walk(tree, start, &mut visited, &mut out);
    }
    out.recovered = out.order.len() - reached;
    out
}

/// Climb unvisited parent links from `idx`. Stops at an orphan, or at the
/// first message seen twice when the links form a loop.
fn recovery_start(tree: &MessageTree<'_>, idx: usize, visited: &HashSet<usize>) -> usize {
    let mut climbed: HashSet<usize> = HashSet::from([idx]);
    let mut current = idx;
    while let Some(parent) = tree
        .message(current)
        .parent_uuid
        .as_deref()
        .and_then(|p| tree.index_of(p))
    {
        if visited.contains(&parent) {
            break;
        }
        if !climbed.insert(parent) {
            return parent;
        }
        current = parent;
    }
    current
}

enum Frame {
    Enter {
        index: usize,
        depth: usize,
        parent: Option<usize>,
    },
    Exit(usize),
}

fn walk(
    tree: &MessageTree<'_>,
    start: usize,
    visited: &mut HashSet<usize>,
    out: &mut Traversal,
) {
    let mut on_path: HashSet<usize> = HashSet::new();
    let mut stack = vec![Frame::Enter {
        index: start,
        depth: 0,
        parent: None,
    }];
    while let Some(frame) = stack.pop() {
        let (idx, depth, parent) = match frame {
            Frame::Exit(idx) => {
                on_path.remove(&idx);
                continue;
            }
            Frame::Enter {
                index,
                depth,
                parent,
            } => (index, depth, parent),
        };

        if !visited.insert(idx) {
            if on_path.contains(&idx) {
                let uuid = tree.message(idx).uuid.clone();
                let parent_uuid = parent
                    .map(|p| tree.message(p).uuid.clone())
                    .unwrap_or_default();
                warn!(%uuid, %parent_uuid, "Circular parent reference detected, skipping");
                out.cycles.push(CycleEdge { parent_uuid, uuid });
            }
            continue;
        }
        out.order.push(Visit { index: idx, depth });
        on_path.insert(idx);
        stack.push(Frame::Exit(idx));
        for &child in tree.children_of(idx).iter().rev() {
            stack.push(Frame::Enter {
                index: child,
                depth: depth + 1,
                parent: Some(idx),
            });
        }
    }
}
