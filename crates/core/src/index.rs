// crates/core/src/index.rs
//! Lookups over a flattened render sequence.

use std::collections::HashMap;

use transcript_view_types::FlattenedItem;

/// uuid -> position in `items`; placeholders have no entry.
pub fn build_uuid_to_index(items: &[FlattenedItem]) -> HashMap<String, usize> {
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| item.uuid().map(|uuid| (uuid.to_string(), i)))
        .collect()
}

/// Position of the card for the group containing `uuid`.
///
/// `None` when `uuid` is in no group, or when the leader itself was not
/// emitted (e.g. hidden).
pub fn find_group_leader_index(
    uuid: &str,
    member_to_leader: &HashMap<String, String>,
    uuid_to_index: &HashMap<String, usize>,
) -> Option<usize> {
    let leader = member_to_leader.get(uuid)?;
    uuid_to_index.get(leader).copied()
}

/// Position of the placeholder that hides `uuid`.
pub fn find_placeholder_index(items: &[FlattenedItem], uuid: &str) -> Option<usize> {
    items.iter().position(|item| {
        item.as_placeholder()
            .is_some_and(|p| p.hidden_uuids.iter().any(|h| h == uuid))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use transcript_view_types::{HiddenPlaceholder, Message, MessageItem};

    fn items() -> Vec<FlattenedItem> {
        vec![
            FlattenedItem::Message(MessageItem::plain(Message::user("a", "a"), 0, 0)),
            FlattenedItem::HiddenPlaceholder(HiddenPlaceholder {
                hidden_count: 2,
                hidden_uuids: vec!["h1".into(), "h2".into()],
            }),
            FlattenedItem::Message(MessageItem::plain(Message::user("b", "b"), 0, 1)),
        ]
    }

    #[test]
    fn test_uuid_to_index_skips_placeholders() {
        let map = build_uuid_to_index(&items());
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], 0);
        assert_eq!(map["b"], 2);
        assert!(!map.contains_key("h1"));
    }

    #[test]
    fn test_find_group_leader_index() {
        let uuid_to_index = build_uuid_to_index(&items());
        let member_to_leader = HashMap::from([
            ("b".to_string(), "b".to_string()),
            ("m".to_string(), "b".to_string()),
            ("x".to_string(), "h1".to_string()),
        ]);
        assert_eq!(find_group_leader_index("m", &member_to_leader, &uuid_to_index), Some(2));
        assert_eq!(find_group_leader_index("b", &member_to_leader, &uuid_to_index), Some(2));
        assert_eq!(find_group_leader_index("a", &member_to_leader, &uuid_to_index), None);
        assert_eq!(find_group_leader_index("x", &member_to_leader, &uuid_to_index), None);
    }

    #[test]
    fn test_find_placeholder_index() {
        assert_eq!(find_placeholder_index(&items(), "h2"), Some(1));
        assert_eq!(find_placeholder_index(&items(), "a"), None);
    }
}
