use super::openai::{Conversation, ConversationItem, CreateResponseRequest};
use super::{ClientFactory, ResponsesApi};
use crate::payload::{ContentFragment, Item, MessageItem, Reply};
use crate::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct MockState {
    models: Vec<String>,
    replies: Vec<Reply>,
    stored_replies: HashMap<String, Reply>,
    input_items: HashMap<String, Vec<Item>>,
    conversation_items: HashMap<String, Vec<Item>>,
    failure: Option<String>,
    requests: Vec<CreateResponseRequest>,
    appended: Vec<(String, Vec<ConversationItem>)>,
    api_keys: Vec<String>,
    conversations_created: usize,
}

/// In-memory [`ResponsesApi`] that records every call.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect the recorded calls through another.
#[derive(Clone, Default)]
pub struct MockResponsesClient {
    state: Arc<Mutex<MockState>>,
}

impl MockResponsesClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a reply holding a single assistant message.
    pub fn text_reply(id: &str, model: &str, text: &str) -> Reply {
        Reply {
            id: id.to_string(),
            model: Some(model.to_string()),
            created_at: Some(1_700_000_000),
            output: vec![Item::Message(MessageItem {
                id: Some(format!("msg_{}", id)),
                role: Some("assistant".to_string()),
                content: vec![ContentFragment::OutputText {
                    text: text.to_string(),
                }],
            })],
        }
    }

    pub fn with_models(self, models: &[&str]) -> Self {
        self.state.lock().models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    /// Queue a reply for `create_response`; replies cycle when exhausted.
    pub fn with_reply(self, reply: Reply) -> Self {
        self.state.lock().replies.push(reply);
        self
    }

    /// Make a reply available to `retrieve_response`.
    pub fn with_stored_reply(self, reply: Reply) -> Self {
        self.state
            .lock()
            .stored_replies
            .insert(reply.id.clone(), reply);
        self
    }

    pub fn with_input_items(self, response_id: &str, items: Vec<Item>) -> Self {
        self.state
            .lock()
            .input_items
            .insert(response_id.to_string(), items);
        self
    }

    pub fn with_conversation_items(self, conversation_id: &str, items: Vec<Item>) -> Self {
        self.state
            .lock()
            .conversation_items
            .insert(conversation_id.to_string(), items);
        self
    }

    /// Fail every call with an upstream error carrying `message`.
    pub fn failing(self, message: &str) -> Self {
        self.state.lock().failure = Some(message.to_string());
        self
    }

    pub fn requests(&self) -> Vec<CreateResponseRequest> {
        self.state.lock().requests.clone()
    }

    pub fn appended_items(&self) -> Vec<(String, Vec<ConversationItem>)> {
        self.state.lock().appended.clone()
    }

    pub fn api_keys(&self) -> Vec<String> {
        self.state.lock().api_keys.clone()
    }

    fn check_failure(&self) -> Result<()> {
        match &self.state.lock().failure {
            Some(message) => Err(Error::Upstream(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResponsesApi for MockResponsesClient {
    async fn list_models(&self) -> Result<Vec<String>> {
        self.check_failure()?;
        Ok(self.state.lock().models.clone())
    }

    async fn create_response(&self, request: &CreateResponseRequest) -> Result<Reply> {
        self.check_failure()?;

        let mut state = self.state.lock();
        state.requests.push(request.clone());
        let count = state.requests.len();

        if state.replies.is_empty() {
            let id = format!("resp_mock_{}", count);
            Ok(Self::text_reply(&id, &request.model, "Mock reply"))
        } else {
            let index = (count - 1) % state.replies.len();
            Ok(state.replies[index].clone())
        }
    }

    async fn retrieve_response(&self, response_id: &str) -> Result<Reply> {
        self.check_failure()?;
        self.state
            .lock()
            .stored_replies
            .get(response_id)
            .cloned()
            .ok_or_else(|| {
                Error::Upstream(format!("No response found with id '{}'", response_id))
            })
    }

    async fn list_input_items(&self, response_id: &str) -> Result<Vec<Item>> {
        self.check_failure()?;
        Ok(self
            .state
            .lock()
            .input_items
            .get(response_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_conversation(&self) -> Result<Conversation> {
        self.check_failure()?;
        let mut state = self.state.lock();
        state.conversations_created += 1;
        Ok(Conversation {
            id: format!("conv_mock_{}", state.conversations_created),
        })
    }

    async fn append_conversation_items(
        &self,
        conversation_id: &str,
        items: &[ConversationItem],
    ) -> Result<()> {
        self.check_failure()?;
        self.state
            .lock()
            .appended
            .push((conversation_id.to_string(), items.to_vec()));
        Ok(())
    }

    async fn list_conversation_items(&self, conversation_id: &str) -> Result<Vec<Item>> {
        self.check_failure()?;
        Ok(self
            .state
            .lock()
            .conversation_items
            .get(conversation_id)
            .cloned()
            .unwrap_or_default())
    }
}

impl ClientFactory for MockResponsesClient {
    fn connect(&self, api_key: &str) -> Box<dyn ResponsesApi> {
        self.state.lock().api_keys.push(api_key.to_string());
        Box::new(self.clone())
    }
}
