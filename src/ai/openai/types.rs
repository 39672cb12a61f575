//! OpenAI Responses/Conversations request and response payloads.

use crate::payload::{InputContent, Item, MessageInput, Role};
use serde::{Deserialize, Serialize};

/// Reasoning-effort hint for reasoning-capable models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    /// Parse a caller-supplied effort; blank means "not set".
    pub fn parse(value: &str) -> Option<Result<Self, String>> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" => None,
            "low" => Some(Ok(Self::Low)),
            "medium" => Some(Ok(Self::Medium)),
            "high" => Some(Ok(Self::High)),
            other => Some(Err(format!(
                "Invalid reasoning effort '{}'. Expected low, medium or high",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reasoning {
    pub effort: ReasoningEffort,
}

/// Request body for `POST /v1/responses`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateResponseRequest {
    pub model: String,
    pub input: MessageInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Reasoning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// `GET /v1/models` listing.
#[derive(Debug, Deserialize)]
pub struct ModelList {
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}

/// Paged item listing (input items, conversation items).
#[derive(Debug, Deserialize)]
pub struct ItemList {
    #[serde(default)]
    pub data: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Conversation {
    pub id: String,
}

/// An item appended to a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationItem {
    Message {
        role: Role,
        content: Vec<InputContent>,
    },
}

impl ConversationItem {
    /// A single-fragment text message typed for its speaker.
    pub fn text_message(role: Role, text: impl Into<String>) -> Self {
        Self::Message {
            role,
            content: vec![InputContent::text_for(role, text)],
        }
    }
}

/// Body for `POST /v1/conversations/{id}/items`.
#[derive(Debug, Serialize)]
pub struct AppendItemsRequest<'a> {
    pub items: &'a [ConversationItem],
}
