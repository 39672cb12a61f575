use axum::{
    extract::{Multipart, Path, Query, State},
    response::Html,
    Form, Json,
};
use serde::Serialize;

use super::error::ApiError;
use super::form::{
    parse_effort, present, ApiKeyQuery, ContinueConversationForm, CreateConversationForm,
    SendForm,
};
use super::AppState;
use crate::ai::ResponsesApi;
use crate::cache::CachedTurn;
use crate::catalog::select_models;
use crate::history::{self, ConversationMessage, ResponseHistory};
use crate::turn::{send_turn, ConversationLink, TurnReply, TurnRequest};

const INDEX_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub success: bool,
    pub response: String,
    pub new_response_id: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct CreateConversationResponse {
    pub success: bool,
    pub conversation_id: String,
    pub items_added: usize,
    pub name: String,
    pub from_response_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContinueConversationResponse {
    pub success: bool,
    pub response: String,
    pub response_id: String,
    pub conversation_id: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationItemsResponse {
    pub conversation_id: String,
    pub messages: Vec<ConversationMessage>,
}

impl AppState {
    /// Bind the caller's credential, falling back to the configured one.
    fn connect(&self, supplied: &str) -> Result<Box<dyn ResponsesApi>, ApiError> {
        let api_key = present(supplied)
            .or_else(|| self.fallback_api_key.clone())
            .ok_or_else(|| ApiError::BadRequest("API key is required".to_string()))?;
        Ok(self.clients.connect(&api_key))
    }

    fn model_or_default(&self, model: &str) -> String {
        present(model).unwrap_or_else(|| self.default_model.clone())
    }

    fn remember(&self, user_text: &str, reply: &TurnReply) {
        self.cache.insert(
            reply.response_id.clone(),
            CachedTurn::new(user_text.to_string(), reply.text.clone(), reply.model.clone()),
        );
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now(),
    })
}

pub async fn list_models(
    State(state): State<AppState>,
    Query(query): Query<ApiKeyQuery>,
) -> Result<Json<ModelsResponse>, ApiError> {
    let api = state.connect(&query.api_key)?;
    let models = select_models(api.list_models().await?);

    Ok(Json(ModelsResponse { models }))
}

pub async fn send_message(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SendResponse>, ApiError> {
    let form = SendForm::from_multipart(multipart).await?;
    let api = state.connect(&form.api_key)?;

    let request = TurnRequest::new(state.model_or_default(&form.model), form.message.trim())
        .with_images(form.images)
        .with_link(present(&form.response_id).map(ConversationLink::PreviousResponse))
        .with_reasoning_effort(parse_effort(&form.reasoning_effort)?);

    if request.is_empty() {
        return Err(ApiError::BadRequest("Message or images required".to_string()));
    }

    let reply = send_turn(api.as_ref(), &request).await?;
    state.remember(&request.text, &reply);

    Ok(Json(SendResponse {
        success: true,
        response: reply.text,
        new_response_id: reply.response_id,
        model: reply.model,
    }))
}

pub async fn response_history(
    State(state): State<AppState>,
    Path(response_id): Path<String>,
    Query(query): Query<ApiKeyQuery>,
) -> Result<Json<ResponseHistory>, ApiError> {
    let api = state.connect(&query.api_key)?;
    let response_id = present(&response_id)
        .ok_or_else(|| ApiError::BadRequest("Response ID is required".to_string()))?;

    let history = history::response_history(api.as_ref(), &response_id).await?;
    Ok(Json(history))
}

pub async fn cached_turn(
    State(state): State<AppState>,
    Path(response_id): Path<String>,
) -> Result<Json<CachedTurn>, ApiError> {
    state
        .cache
        .get(&response_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No cached turn for '{}'", response_id)))
}

pub async fn create_conversation(
    State(state): State<AppState>,
    Form(form): Form<CreateConversationForm>,
) -> Result<Json<CreateConversationResponse>, ApiError> {
    let api = state.connect(&form.api_key)?;
    let from_response_id = present(&form.from_response_id);

    let outcome =
        history::migrate_response_to_conversation(api.as_ref(), from_response_id.as_deref())
            .await?;

    Ok(Json(CreateConversationResponse {
        success: true,
        conversation_id: outcome.conversation_id,
        items_added: outcome.items_added,
        name: form.name.trim().to_string(),
        from_response_id,
    }))
}

pub async fn continue_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Form(form): Form<ContinueConversationForm>,
) -> Result<Json<ContinueConversationResponse>, ApiError> {
    let api = state.connect(&form.api_key)?;
    let message = present(&form.message)
        .ok_or_else(|| ApiError::BadRequest("Message is required".to_string()))?;

    let request = TurnRequest::new(state.model_or_default(&form.model), message)
        .with_link(Some(ConversationLink::Conversation(conversation_id.clone())))
        .with_reasoning_effort(parse_effort(&form.reasoning_effort)?);

    let reply = send_turn(api.as_ref(), &request).await?;
    state.remember(&request.text, &reply);

    Ok(Json(ContinueConversationResponse {
        success: true,
        response: reply.text,
        response_id: reply.response_id,
        conversation_id,
        model: reply.model,
    }))
}

pub async fn conversation_items(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<ApiKeyQuery>,
) -> Result<Json<ConversationItemsResponse>, ApiError> {
    let api = state.connect(&query.api_key)?;
    let messages = history::conversation_messages(api.as_ref(), &conversation_id).await?;

    Ok(Json(ConversationItemsResponse {
        conversation_id,
        messages,
    }))
}
