//! Request-side payload construction.

use super::attachment::ImageSource;
use serde::Serialize;

/// Speaker of an input message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Developer,
}

impl Role {
    /// Parse an upstream role string. Roles a message cannot be written
    /// with (`tool`, ...) are `None`.
    pub fn parse(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            "developer" => Some(Self::Developer),
            _ => None,
        }
    }
}

/// One fragment of a structured message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputContent {
    InputText { text: String },
    InputImage { image_url: String },
    OutputText { text: String },
}

impl InputContent {
    /// Text fragment typed for the speaker: assistants produce `output_text`,
    /// everyone else `input_text`.
    pub fn text_for(role: Role, text: impl Into<String>) -> Self {
        match role {
            Role::Assistant => Self::OutputText { text: text.into() },
            _ => Self::InputText { text: text.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputMessage {
    pub role: Role,
    pub content: Vec<InputContent>,
}

/// The `input` field of a create-response call.
///
/// Serialises either as a bare string or as a list of messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MessageInput {
    Text(String),
    Messages(Vec<InputMessage>),
}

impl MessageInput {
    /// Content fragments of the structured form, empty for plain text.
    pub fn content(&self) -> &[InputContent] {
        match self {
            Self::Text(_) => &[],
            Self::Messages(messages) => messages
                .first()
                .map(|message| message.content.as_slice())
                .unwrap_or(&[]),
        }
    }
}

/// Compose text and images into the upstream `input` shape.
///
/// Without images the text is returned as-is, even when empty. With images a
/// single user message is built: the text fragment first (only when the text
/// is non-empty), then one image fragment per source in input order.
pub fn build_request(text: &str, images: &[ImageSource]) -> MessageInput {
    if images.is_empty() {
        return MessageInput::Text(text.to_string());
    }

    let mut content = Vec::with_capacity(images.len() + 1);
    if !text.is_empty() {
        content.push(InputContent::InputText {
            text: text.to_string(),
        });
    }
    content.extend(images.iter().map(|image| InputContent::InputImage {
        image_url: image.image_url(),
    }));

    MessageInput::Messages(vec![InputMessage {
        role: Role::User,
        content,
    }])
}
