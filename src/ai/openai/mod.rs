pub mod client;
pub mod responses;
pub mod types;

pub use responses::{OpenAiClientFactory, OpenAiResponsesClient};
pub use types::{
    Conversation, ConversationItem, CreateResponseRequest, Reasoning, ReasoningEffort,
};
