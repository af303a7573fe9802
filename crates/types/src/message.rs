// crates/types/src/message.rs
//! Raw transcript records as supplied by the session loading layer.
//!
//! These mirror one JSONL line of a Claude Code session after the loader has
//! lifted `message.content` to the top level. Nothing in the engine mutates a
//! `Message` it was handed; transforms produce new values.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Top-level `type` tag of a transcript record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    User,
    Assistant,
    System,
    Summary,
    Progress,
    FileHistorySnapshot,
    QueueOperation,
    #[serde(other)]
    Other,
}

/// Message body: either a plain string or a list of content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
    },
    ToolUse {
        #[serde(default)]
        id: String,
        name: String,
        #[serde(default)]
        input: serde_json::Value,
    },
    ToolResult {
        #[serde(default)]
        tool_use_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    #[serde(other)]
    Other,
}

/// A tool invocation borrowed out of an assistant message's content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolUseRef<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub input: &'a serde_json::Value,
}

/// One transcript record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../../src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
    /// ISO 8601 as written by the CLI. May be empty or malformed.
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use_result: Option<serde_json::Value>,
    /// Payload of `progress` records (`data.type`, `data.agentId`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, rename = "toolUseID", skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<String>,
    #[serde(default, rename = "parentToolUseID", skip_serializing_if = "Option::is_none")]
    pub parent_tool_use_id: Option<String>,
}

impl Message {
    pub fn new(uuid: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            uuid: uuid.into(),
            parent_uuid: None,
            timestamp: String::new(),
            message_type,
            content: None,
            tool_use: None,
            tool_use_result: None,
            data: None,
            tool_use_id: None,
            parent_tool_use_id: None,
        }
    }

    pub fn user(uuid: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(uuid, MessageType::User).with_text(text)
    }

    pub fn assistant(uuid: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(uuid, MessageType::Assistant).with_text(text)
    }

    pub fn with_parent(mut self, parent_uuid: impl Into<String>) -> Self {
        self.parent_uuid = Some(parent_uuid.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content = Some(MessageContent::Text(text.into()));
        self
    }

    pub fn with_blocks(mut self, blocks: Vec<ContentBlock>) -> Self {
        self.content = Some(MessageContent::Blocks(blocks));
        self
    }

    pub fn with_tool_use_result(mut self, result: serde_json::Value) -> Self {
        self.tool_use_result = Some(result);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_parent_tool_use_id(mut self, id: impl Into<String>) -> Self {
        self.parent_tool_use_id = Some(id.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_uuid.is_none()
    }

    /// Text visible to a reader: the string body, or every `text` block
    /// joined by newlines. Tool blocks and thinking are not included.
    pub fn text_content(&self) -> String {
        match &self.content {
            Some(MessageContent::Text(s)) => s.clone(),
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
            None => String::new(),
        }
    }

    /// Every `tool_use` block in content order.
    pub fn tool_uses(&self) -> Vec<ToolUseRef<'_>> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolUse { id, name, input } => Some(ToolUseRef {
                        id: id.as_str(),
                        name: name.as_str(),
                        input,
                    }),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// `tool_use_id`s answered by `tool_result` blocks in this message.
    pub fn tool_result_ids(&self) -> Vec<&str> {
        match &self.content {
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolResult { tool_use_id, .. } if !tool_use_id.is_empty() => {
                        Some(tool_use_id.as_str())
                    }
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}
