//! Conversation history views and response-to-conversation migration.
//!
//! Upstream lists input and conversation items newest first; everything
//! returned from here is in chronological order.

use crate::ai::openai::ConversationItem;
use crate::ai::ResponsesApi;
use crate::payload::{Item, MessageItem, Role};
use crate::Result;
use serde::Serialize;

fn role_or_unknown(message: &MessageItem) -> String {
    message
        .role
        .clone()
        .unwrap_or_else(|| "unknown".to_string())
}

/// One input message of a stored response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
}

impl HistoryMessage {
    fn from_item(message: &MessageItem) -> Self {
        Self {
            role: role_or_unknown(message),
            content: message.transcript_text(),
        }
    }
}

/// One message of a conversation; `id` is `null` when upstream has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationMessage {
    pub id: Option<String>,
    pub role: String,
    pub content: String,
}

impl ConversationMessage {
    fn from_item(message: &MessageItem) -> Self {
        Self {
            id: message.id.clone(),
            role: role_or_unknown(message),
            content: message.transcript_text(),
        }
    }
}

/// Everything known about one response: its inputs and its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseHistory {
    pub response_id: String,
    pub model: String,
    pub messages: Vec<HistoryMessage>,
    pub output: String,
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationOutcome {
    pub conversation_id: String,
    pub items_added: usize,
}

fn chronological_messages(items: &[Item]) -> impl Iterator<Item = &MessageItem> {
    items.iter().rev().filter_map(|item| match item {
        Item::Message(message) => Some(message),
        Item::Other => None,
    })
}

/// Inputs (oldest first) and output text of a stored response.
pub async fn response_history(api: &dyn ResponsesApi, response_id: &str) -> Result<ResponseHistory> {
    let reply = api.retrieve_response(response_id).await?;
    let input_items = api.list_input_items(response_id).await?;

    let messages = chronological_messages(&input_items)
        .map(HistoryMessage::from_item)
        .collect();

    Ok(ResponseHistory {
        response_id: response_id.to_string(),
        output: reply.text(),
        model: reply.model.unwrap_or_else(|| "unknown".to_string()),
        messages,
        created_at: reply.created_at,
    })
}

/// Messages of a conversation, oldest first.
pub async fn conversation_messages(
    api: &dyn ResponsesApi,
    conversation_id: &str,
) -> Result<Vec<ConversationMessage>> {
    let items = api.list_conversation_items(conversation_id).await?;
    Ok(chronological_messages(&items)
        .map(ConversationMessage::from_item)
        .collect())
}

/// Create a conversation, optionally seeded with a response's history.
///
/// Input messages are replayed in listing order with their roles kept, then
/// the response's own output is appended as an assistant message. Messages
/// without text, or with a role a conversation cannot hold, are skipped. Each message is appended with its own call.
pub async fn migrate_response_to_conversation(
    api: &dyn ResponsesApi,
    from_response_id: Option<&str>,
) -> Result<MigrationOutcome> {
    let conversation = api.create_conversation().await?;
    tracing::info!("Created conversation {}", conversation.id);

    let mut items_added = 0;

    if let Some(response_id) = from_response_id {
        let reply = api.retrieve_response(response_id).await?;
        let input_items = api.list_input_items(response_id).await?;

        for item in &input_items {
            let Item::Message(message) = item else {
                continue;
            };
            let content = message.transcript_text();
            if content.is_empty() {
                continue;
            }

            let raw_role = message.role.as_deref().unwrap_or("user");
            let Some(role) = Role::parse(raw_role) else {
                tracing::warn!(
                    "Skipping {} message {:?}: role cannot be written to a conversation",
                    raw_role,
                    message.id
                );
                continue;
            };
            api.append_conversation_items(
                &conversation.id,
                &[ConversationItem::text_message(role, content)],
            )
            .await?;
            items_added += 1;
        }

        let output = reply.text();
        if !output.is_empty() {
            api.append_conversation_items(
                &conversation.id,
                &[ConversationItem::text_message(Role::Assistant, output)],
            )
            .await?;
            items_added += 1;
        }

        tracing::info!(
            "Migrated {} item(s) from {} into {}",
            items_added,
            response_id,
            conversation.id
        );
    }

    Ok(MigrationOutcome {
        conversation_id: conversation.id,
        items_added,
    })
}
