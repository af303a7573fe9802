// crates/core/src/command_merge.rs
//! Fold local slash-command output into the command message that produced it.
//!
//! Running `/cost` writes two records: one whose text carries
//! `<command-name>/cost</command-name>`, and a child whose only text is
//! `<local-command-stdout>...</local-command-stdout>` (sometimes next to a
//! `<local-command-caveat>`). The viewer shows these as one card.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex_lite::Regex;
use tracing::debug;
use transcript_view_types::{Message, MessageContent};

fn stdout_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<local-command-stdout>(.*?)</local-command-stdout>")
            .expect("static regex")
    })
}

fn caveat_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<local-command-caveat>.*?</local-command-caveat>").expect("static regex")
    })
}

/// True when `text` is nothing but captured command output with a
/// non-blank stdout region.
pub fn is_command_output(text: &str) -> bool {
    let has_stdout = stdout_regex()
        .captures_iter(text)
        .any(|caps| caps.get(1).is_some_and(|m| !m.as_str().trim().is_empty()));
    if !has_stdout {
        return false;
    }
    let stripped = stdout_regex().replace_all(text, "");
    let stripped = caveat_regex().replace_all(&stripped, "");
    stripped.trim().is_empty()
}

pub fn is_command_invocation(text: &str) -> bool {
    text.contains("<command-name>")
}

/// Merge every command/output pair in one pass.
///
/// The output child is removed and its text appended to the parent after a
/// newline. Children of a removed output are re-parented onto the command
/// message. Returns the input untouched when nothing matches, along with
/// the number of merged pairs.
pub fn merge_command_outputs(messages: Vec<Message>) -> (Vec<Message>, usize) {
    let by_uuid: HashMap<&str, usize> = messages
        .iter()
        .enumerate()
        .map(|(i, m)| (m.uuid.as_str(), i))
        .collect();

    // (parent index, child index) in stream order, judged on original content.
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for (child_idx, child) in messages.iter().enumerate() {
        let Some(parent_idx) = child
            .parent_uuid
            .as_deref()
            .and_then(|p| by_uuid.get(p).copied())
        else {
            continue;
        };
        if parent_idx == child_idx {
            continue;
        }
        if is_command_output(&child.text_content())
            && is_command_invocation(&messages[parent_idx].text_content())
        {
            pairs.push((parent_idx, child_idx));
        }
    }

    if pairs.is_empty() {
        return (messages, 0);
    }

    let removed: HashSet<usize> = pairs.iter().map(|&(_, c)| c).collect();
    let mut merged_text: HashMap<usize, String> = HashMap::new();
    for &(parent_idx, child_idx) in &pairs {
        let child_text = messages[child_idx].text_content();
        let entry = merged_text
            .entry(parent_idx)
            .or_insert_with(|| messages[parent_idx].text_content());
        entry.push('\n');
        entry.push_str(&child_text);
    }

    let new_parent: HashMap<String, String> = pairs
        .iter()
        .map(|&(p, c)| (messages[c].uuid.clone(), messages[p].uuid.clone()))
        .collect();

    let merged = pairs.len();
    let out: Vec<Message> = messages
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
        .map(|(i, mut message)| {
            if let Some(text) = merged_text.remove(&i) {
                message.content = Some(MessageContent::Text(text));
            }
            let mut parent = message.parent_uuid.take();
            // Follow chains of removed outputs up to a surviving ancestor.
            let mut hops = 0;
            while let Some(next) = parent.as_ref().and_then(|p| new_parent.get(p)) {
                parent = Some(next.clone());
                hops += 1;
                if hops > new_parent.len() {
                    break;
                }
            }
            message.parent_uuid = parent;
            message
        })
        .collect();

    debug!(merged, "Merged local command output into command messages");
    (out, merged)
}
