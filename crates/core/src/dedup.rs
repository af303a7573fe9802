// crates/core/src/dedup.rs
use std::collections::HashMap;

use tracing::debug;
use transcript_view_types::Message;

/// Collapse repeated UUIDs (overlapping pagination pages) to one entry each.
///
/// The first occurrence fixes the position, the last occurrence supplies the
/// value. Returns the deduplicated list and how many records were dropped.
pub fn dedupe_messages(messages: Vec<Message>) -> (Vec<Message>, usize) {
    let total = messages.len();
    let mut position: HashMap<String, usize> = HashMap::with_capacity(total);
    let mut out: Vec<Message> = Vec::with_capacity(total);

    for message in messages {
        match position.get(&message.uuid) {
            Some(&idx) => out[idx] = message,
            None => {
                position.insert(message.uuid.clone(), out.len());
                out.push(message);
            }
        }
    }

    let removed = total - out.len();
    if removed > 0 {
        debug!(removed, kept = out.len(), "Collapsed duplicate message uuids");
    }
    (out, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn uuids(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.uuid.as_str()).collect()
    }

    #[test]
    fn test_empty_input() {
        let (out, removed) = dedupe_messages(Vec::new());
        assert!(out.is_empty());
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_first_position_last_value() {
        let input = vec![
            Message::user("a", "first a"),
            Message::user("b", "b"),
            Message::user("a", "second a"),
            Message::user("c", "c"),
        ];
        let (out, removed) = dedupe_messages(input);
        assert_eq!(removed, 1);
        assert_eq!(uuids(&out), vec!["a", "b", "c"]);
        assert_eq!(out[0].text_content(), "second a");
    }

    #[test]
    fn test_no_duplicates_is_identity() {
        let input = vec![Message::user("x", "1"), Message::assistant("y", "2")];
        let (out, removed) = dedupe_messages(input.clone());
        assert_eq!(removed, 0);
        assert_eq!(out, input);
    }
}
