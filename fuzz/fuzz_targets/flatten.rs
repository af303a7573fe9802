//! Fuzz target: arbitrary JSONL -> flatten_conversation.
//!
//! Must never panic, and every decoded message must be accounted for in the
//! render sequence (a card, a hidden placeholder entry, or a group member).

#![no_main]

use std::collections::{HashMap, HashSet};

use libfuzzer_sys::fuzz_target;
use transcript_view_core::types::{FlattenedItem, Message};
use transcript_view_core::{flatten_conversation, FlattenConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let messages: Vec<Message> = text
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();

    // Hide every third message to exercise placeholder runs.
    let hidden: HashSet<String> = messages
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 == 0)
        .map(|(_, m)| m.uuid.clone())
        .collect();
    let uuids: HashSet<String> = messages.iter().map(|m| m.uuid.clone()).collect();

    let out = flatten_conversation(messages, &hidden, &FlattenConfig::default());

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for item in &out.items {
        match item {
            FlattenedItem::Message(m) => *seen.entry(m.message.uuid.as_str()).or_default() += 1,
            FlattenedItem::HiddenPlaceholder(p) => {
                for uuid in &p.hidden_uuids {
                    *seen.entry(uuid.as_str()).or_default() += 1;
                }
            }
        }
    }
    for (uuid, count) in &seen {
        assert_eq!(*count, 1, "{uuid} rendered {count} times");
    }
    // Merged command outputs legitimately disappear.
    let accounted = uuids
        .iter()
        .filter(|u| seen.contains_key(u.as_str()) || out.member_to_leader.contains_key(*u))
        .count();
    assert!(accounted + out.diagnostics.merged_command_outputs >= uuids.len());
});
