//! OpenAI Responses + Conversations client implementation.

use super::client::OpenAiHttpClient;
use super::types::{
    AppendItemsRequest, Conversation, ConversationItem, CreateResponseRequest, ItemList,
    ModelList,
};
use crate::ai::{ClientFactory, ResponsesApi};
use crate::payload::{Item, Reply};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// OpenAI implementation of [`ResponsesApi`] bound to one credential.
pub struct OpenAiResponsesClient {
    http: OpenAiHttpClient,
}

impl OpenAiResponsesClient {
    pub fn new_with_client(api_key: String, client: reqwest::Client) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

/// An upstream id used as a path segment. Ids are opaque, but an empty or
/// dot-only id would name a different resource.
fn path_id(id: &str) -> Result<&str> {
    match id {
        "" | "." | ".." => Err(Error::InvalidInput(format!("Invalid id '{}'", id))),
        _ => Ok(id),
    }
}

#[async_trait]
impl ResponsesApi for OpenAiResponsesClient {
    async fn list_models(&self) -> Result<Vec<String>> {
        let models: ModelList = self.http.get(&["v1", "models"]).await?;
        Ok(models.data.into_iter().map(|model| model.id).collect())
    }

    async fn create_response(&self, request: &CreateResponseRequest) -> Result<Reply> {
        tracing::debug!(
            "Creating response (model: {}, continuing: {})",
            request.model,
            request.previous_response_id.is_some() || request.conversation.is_some()
        );
        self.http.post(&["v1", "responses"], request).await
    }

    async fn retrieve_response(&self, response_id: &str) -> Result<Reply> {
        self.http
            .get(&["v1", "responses", path_id(response_id)?])
            .await
    }

    async fn list_input_items(&self, response_id: &str) -> Result<Vec<Item>> {
        let items: ItemList = self
            .http
            .get(&["v1", "responses", path_id(response_id)?, "input_items"])
            .await?;
        Ok(items.data)
    }

    async fn create_conversation(&self) -> Result<Conversation> {
        self.http
            .post(&["v1", "conversations"], &serde_json::json!({}))
            .await
    }

    async fn append_conversation_items(
        &self,
        conversation_id: &str,
        items: &[ConversationItem],
    ) -> Result<()> {
        let _: serde_json::Value = self
            .http
            .post(
                &["v1", "conversations", path_id(conversation_id)?, "items"],
                &AppendItemsRequest { items },
            )
            .await?;
        Ok(())
    }

    async fn list_conversation_items(&self, conversation_id: &str) -> Result<Vec<Item>> {
        let items: ItemList = self
            .http
            .get(&["v1", "conversations", path_id(conversation_id)?, "items"])
            .await?;
        Ok(items.data)
    }
}

/// Builds per-credential clients over one shared connection pool.
#[derive(Clone)]
pub struct OpenAiClientFactory {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiClientFactory {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }
}

impl ClientFactory for OpenAiClientFactory {
    fn connect(&self, api_key: &str) -> Box<dyn ResponsesApi> {
        Box::new(
            OpenAiResponsesClient::new_with_client(api_key.to_string(), self.client.clone())
                .with_base_url(self.base_url.clone()),
        )
    }
}
