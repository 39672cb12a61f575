//! Reply-side normalisation.
//!
//! Upstream replies carry an ordered list of output items; only `message`
//! items hold text, and within them only `output_text` fragments count
//! toward the reply text. Other item and fragment kinds decode to catch-all
//! variants and contribute nothing.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer};

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A create/retrieve-response reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reply {
    pub id: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: Vec<Item>,
}

impl Reply {
    /// Decode a reply from raw JSON.
    ///
    /// A `null` reply or one missing required structure is a
    /// [`Error::MalformedReply`].
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Err(Error::MalformedReply("reply is absent".to_string()));
        }
        serde_json::from_value(value).map_err(|e| Error::MalformedReply(e.to_string()))
    }

    /// Concatenated `output_text` of every message item, in order.
    pub fn text(&self) -> String {
        extract_text(self)
    }
}

/// One entry of a reply's output or of an input-item listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Message(MessageItem),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MessageItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentFragment>,
}

impl MessageItem {
    /// Text of `output_text` fragments only.
    pub fn output_text(&self) -> String {
        let mut text = String::new();
        for fragment in &self.content {
            match fragment {
                ContentFragment::OutputText { text: t } => text.push_str(t),
                ContentFragment::Unknown => {
                    tracing::warn!("Skipping content fragment of unrecognized type in reply");
                }
                _ => {}
            }
        }
        text
    }

    /// Text of every text-bearing fragment (`input_text` and `output_text`),
    /// as used for history listings where user turns are `input_text`.
    pub fn transcript_text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentFragment::text)
            .collect()
    }
}

/// A content fragment inside a message item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentFragment {
    OutputText {
        text: String,
    },
    InputText {
        text: String,
    },
    Refusal {
        #[serde(default)]
        refusal: String,
    },
    InputImage {
        #[serde(default)]
        image_url: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl ContentFragment {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::OutputText { text } | Self::InputText { text } => Some(text),
            _ => None,
        }
    }
}

/// Concatenate every `output_text` fragment of every message item in order,
/// with no separator. Never fails; a reply with no text yields `""`.
pub fn extract_text(reply: &Reply) -> String {
    reply
        .output
        .iter()
        .filter_map(|item| match item {
            Item::Message(message) => Some(message.output_text()),
            Item::Other => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(output: serde_json::Value) -> Reply {
        Reply::from_value(json!({"id": "resp_1", "model": "gpt-4o", "output": output})).unwrap()
    }

    #[test]
    fn test_empty_output_yields_empty_text() {
        assert_eq!(extract_text(&reply(json!([]))), "");
    }

    #[test]
    fn test_missing_or_null_output_is_empty() {
        let missing = Reply::from_value(json!({"id": "resp_1"})).unwrap();
        assert_eq!(missing.text(), "");

        let null = Reply::from_value(json!({"id": "resp_1", "output": null})).unwrap();
        assert_eq!(null.text(), "");
    }

    #[test]
    fn test_skips_other_items_and_concatenates_in_order() {
        let reply = reply(json!([
            {"type": "other"},
            {"type": "message", "content": [{"type": "output_text", "text": "A"}]},
            {"type": "message", "content": [{"type": "output_text", "text": "B"}]}
        ]));

        assert_eq!(extract_text(&reply), "AB");
    }

    #[test]
    fn test_reasoning_items_contribute_nothing() {
        let reply = reply(json!([
            {"type": "reasoning", "id": "rs_1", "summary": []},
            {"type": "message", "role": "assistant", "content": [
                {"type": "output_text", "text": "Hello! How can I help you?", "annotations": []}
            ]}
        ]));

        assert_eq!(reply.text(), "Hello! How can I help you?");
    }

    #[test]
    fn test_non_output_text_fragments_are_ignored() {
        let reply = reply(json!([
            {"type": "message", "content": [
                {"type": "refusal", "refusal": "no"},
                {"type": "output_text", "text": "yes"},
                {"type": "mystery_fragment", "text": "guess"},
                {"type": "input_text", "text": "echo"}
            ]}
        ]));

        assert_eq!(reply.text(), "yes");
    }

    #[test]
    fn test_message_with_null_content_contributes_nothing() {
        let reply = reply(json!([{"type": "message", "content": null}]));
        assert_eq!(reply.text(), "");
    }

    #[test]
    fn test_null_reply_is_malformed() {
        let err = Reply::from_value(serde_json::Value::Null).unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
    }

    #[test]
    fn test_reply_without_id_is_malformed() {
        let err = Reply::from_value(json!({"output": []})).unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
    }

    #[test]
    fn test_output_text_without_text_is_malformed() {
        let err = Reply::from_value(json!({
            "id": "resp_1",
            "output": [{"type": "message", "content": [{"type": "output_text"}]}]
        }))
        .unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
    }

    #[test]
    fn test_transcript_text_includes_input_text() {
        let item: MessageItem = serde_json::from_value(json!({
            "role": "user",
            "content": [
                {"type": "input_text", "text": "What is "},
                {"type": "input_image", "image_url": "data:image/png;base64,AA=="},
                {"type": "input_text", "text": "this?"}
            ]
        }))
        .unwrap();

        assert_eq!(item.transcript_text(), "What is this?");
        assert_eq!(item.output_text(), "");
    }
}
