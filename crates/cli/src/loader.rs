// crates/cli/src/loader.rs
//! Read a transcript file into [`Message`]s.
//!
//! Accepted layouts:
//! - JSONL, one record per line (raw session files included)
//! - a JSON array of records
//! - a JSON object with a `messages` array
//!
//! Records that do not decode are skipped at debug level, never fatal.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use transcript_view_types::Message;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Transcript file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied reading file: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Empty transcript file: {path}")]
    Empty { path: PathBuf },
}

impl LoadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}

pub fn load_messages(path: &Path) -> Result<Vec<Message>, LoadError> {
    let raw = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    let trimmed = raw.trim_start();
    if trimmed.is_empty() {
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            match value {
                Value::Array(records) => return Ok(decode_records(records)),
                Value::Object(mut obj) => {
                    if let Some(Value::Array(records)) = obj.remove("messages") {
                        return Ok(decode_records(records));
                    }
                    // A single-record file; fall through to line parsing.
                }
                _ => {}
            }
        }
    }

    Ok(parse_jsonl(&raw))
}

fn decode_records(records: Vec<Value>) -> Vec<Message> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| decode_record(record, i + 1))
        .collect()
}

fn parse_jsonl(raw: &str) -> Vec<Message> {
    let mut messages = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => messages.extend(decode_record(value, line_number)),
            Err(e) => debug!("Skipping malformed JSON at line {}: {}", line_number, e),
        }
    }
    messages
}

/// Raw session lines keep their text under `message.content`; lift it to
/// the top level. Records without a uuid get a positional one.
fn decode_record(mut value: Value, position: usize) -> Option<Message> {
    let Some(obj) = value.as_object_mut() else {
        debug!("Skipping non-object record at {}", position);
        return None;
    };
    if !obj.contains_key("content") {
        if let Some(content) = obj
            .get_mut("message")
            .and_then(|m| m.as_object_mut())
            .and_then(|m| m.remove("content"))
        {
            obj.insert("content".into(), content);
        }
    }
    obj.remove("message");
    if !obj.get("uuid").is_some_and(Value::is_string) {
        obj.insert("uuid".into(), Value::String(format!("line-{position}")));
    }

    match serde_json::from_value::<Message>(value) {
        Ok(message) => Some(message),
        Err(e) => {
            debug!("Skipping undecodable record at {}: {}", position, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use transcript_view_types::MessageType;

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn uuids(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.uuid.as_str()).collect()
    }

    #[test]
    fn test_jsonl_skips_malformed_lines() {
        let file = write(
            r#"{"uuid":"u1","type":"user","content":"hello"}
this is not json {{{

{"uuid":"a1","parentUuid":"u1","type":"assistant","content":[{"type":"text","text":"hi"}]}
"#,
        );
        let messages = load_messages(file.path()).unwrap();
        assert_eq!(uuids(&messages), vec!["u1", "a1"]);
        assert_eq!(messages[1].parent_uuid.as_deref(), Some("u1"));
        assert_eq!(messages[1].text_content(), "hi");
    }

    #[test]
    fn test_raw_session_lines_lift_message_content() {
        let file = write(
            r#"{"uuid":"u1","type":"user","timestamp":"2025-01-01T00:00:00Z","message":{"role":"user","content":"from message"}}
{"type":"progress","timestamp":"2025-01-01T00:00:01Z","data":{"type":"agent_progress","agentId":"abc"}}"#,
        );
        let messages = load_messages(file.path()).unwrap();
        assert_eq!(messages[0].text_content(), "from message");
        assert_eq!(messages[1].uuid, "line-2");
        assert_eq!(messages[1].message_type, MessageType::Progress);
    }

    #[test]
    fn test_json_array_and_messages_object() {
        let array = write(r#"[{"uuid":"a","type":"user"}, 42, {"uuid":"b","type":"assistant"}]"#);
        assert_eq!(uuids(&load_messages(array.path()).unwrap()), vec!["a", "b"]);

        let object = write(r#"{"messages":[{"uuid":"c","type":"system"}]}"#);
        assert_eq!(uuids(&load_messages(object.path()).unwrap()), vec!["c"]);
    }

    #[test]
    fn test_single_record_object_is_jsonl() {
        let file = write(r#"{"uuid":"only","type":"user","content":"x"}"#);
        assert_eq!(uuids(&load_messages(file.path()).unwrap()), vec!["only"]);
    }

    #[test]
    fn test_empty_file() {
        let file = write("  \n\n");
        assert!(matches!(load_messages(file.path()), Err(LoadError::Empty { .. })));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_messages(&dir.path().join("nope.jsonl")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert!(err.to_string().contains("nope.jsonl"));
    }
}
