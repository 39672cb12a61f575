//! A single conversational turn against the upstream API.
//!
//! Every adapter (HTTP routes, one-shot CLI, interactive chat) funnels its
//! input through [`send_turn`]: build the payload, make one upstream call,
//! normalise the reply. No retries happen here.

use crate::ai::openai::{CreateResponseRequest, Reasoning, ReasoningEffort};
use crate::ai::ResponsesApi;
use crate::payload::{build_request, ImageSource};
use crate::Result;
use serde::Serialize;

/// How a turn attaches to earlier context held by the upstream service.
///
/// The two mechanisms are mutually exclusive; the id is passed through
/// untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationLink {
    PreviousResponse(String),
    Conversation(String),
}

impl ConversationLink {
    pub fn id(&self) -> &str {
        match self {
            Self::PreviousResponse(id) | Self::Conversation(id) => id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub model: String,
    pub text: String,
    pub images: Vec<ImageSource>,
    /// `None` starts a fresh conversation.
    pub link: Option<ConversationLink>,
    pub reasoning_effort: Option<ReasoningEffort>,
    pub instructions: Option<String>,
}

impl TurnRequest {
    pub fn new(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
            images: Vec::new(),
            link: None,
            reasoning_effort: None,
            instructions: None,
        }
    }

    pub fn with_images(mut self, images: Vec<ImageSource>) -> Self {
        self.images = images;
        self
    }

    pub fn with_link(mut self, link: Option<ConversationLink>) -> Self {
        self.link = link;
        self
    }

    pub fn with_reasoning_effort(mut self, effort: Option<ReasoningEffort>) -> Self {
        self.reasoning_effort = effort;
        self
    }

    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions;
        self
    }

    /// True when there is neither text nor an image to send.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.images.is_empty()
    }

    /// Upstream request body for this turn.
    pub fn to_upstream(&self) -> CreateResponseRequest {
        let (previous_response_id, conversation) = match &self.link {
            Some(ConversationLink::PreviousResponse(id)) => (Some(id.clone()), None),
            Some(ConversationLink::Conversation(id)) => (None, Some(id.clone())),
            None => (None, None),
        };

        CreateResponseRequest {
            model: self.model.clone(),
            input: build_request(&self.text, &self.images),
            previous_response_id,
            conversation,
            reasoning: self.reasoning_effort.map(|effort| Reasoning { effort }),
            instructions: self.instructions.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReply {
    pub text: String,
    /// Id to continue from on the next turn.
    pub response_id: String,
    pub model: String,
}

/// Send one turn and normalise the reply to plain text.
pub async fn send_turn(api: &dyn ResponsesApi, request: &TurnRequest) -> Result<TurnReply> {
    tracing::debug!(
        "Sending turn (model: {}, images: {}, link: {:?})",
        request.model,
        request.images.len(),
        request.link
    );

    let reply = api.create_response(&request.to_upstream()).await?;
    let text = reply.text();

    Ok(TurnReply {
        text,
        model: reply.model.unwrap_or_else(|| request.model.clone()),
        response_id: reply.id,
    })
}
