//! Upstream completion API integration
//!
//! The [`ResponsesApi`] trait is the single seam between the adapters and the
//! upstream service. [`ClientFactory`] binds a caller-supplied credential to
//! a client, so the HTTP adapter can serve many callers from one pool.

pub mod mock;
pub mod openai;

pub use mock::MockResponsesClient;
pub use openai::{OpenAiClientFactory, OpenAiResponsesClient};

use crate::ai::openai::{Conversation, ConversationItem, CreateResponseRequest};
use crate::payload::{Item, Reply};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ResponsesApi: Send + Sync {
    /// Raw model ids visible to the credential, unfiltered.
    async fn list_models(&self) -> Result<Vec<String>>;
    async fn create_response(&self, request: &CreateResponseRequest) -> Result<Reply>;
    async fn retrieve_response(&self, response_id: &str) -> Result<Reply>;
    /// Input items of a response, newest first as returned upstream.
    async fn list_input_items(&self, response_id: &str) -> Result<Vec<Item>>;
    async fn create_conversation(&self) -> Result<Conversation>;
    async fn append_conversation_items(
        &self,
        conversation_id: &str,
        items: &[ConversationItem],
    ) -> Result<()>;
    /// Conversation items, newest first as returned upstream.
    async fn list_conversation_items(&self, conversation_id: &str) -> Result<Vec<Item>>;
}

pub trait ClientFactory: Send + Sync {
    fn connect(&self, api_key: &str) -> Box<dyn ResponsesApi>;
}
