//! Form payloads accepted by the HTTP routes.
//!
//! All text fields are trimmed; a blank field counts as absent.

use axum::extract::Multipart;
use serde::Deserialize;

use super::error::ApiError;
use crate::ai::openai::ReasoningEffort;
use crate::payload::{Attachment, ImageSource};

pub(crate) fn present(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub(crate) fn parse_effort(value: &str) -> Result<Option<ReasoningEffort>, ApiError> {
    ReasoningEffort::parse(value)
        .transpose()
        .map_err(ApiError::BadRequest)
}

/// Multipart body of `POST /api/send`.
#[derive(Debug, Default)]
pub struct SendForm {
    pub api_key: String,
    pub response_id: String,
    pub message: String,
    pub model: String,
    pub reasoning_effort: String,
    pub images: Vec<ImageSource>,
}

impl SendForm {
    /// Read every field of the upload. File parts without a filename are skipped.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = SendForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "images" {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if filename.is_empty() {
                    continue;
                }
                tracing::debug!("Received upload '{}' ({} bytes)", filename, bytes.len());
                form.images
                    .push(ImageSource::Local(Attachment::encode(&bytes, &filename)));
                continue;
            }

            let value = field.text().await?;
            match name.as_str() {
                "api_key" => form.api_key = value,
                "response_id" => form.response_id = value,
                "message" => form.message = value,
                "model" => form.model = value,
                "reasoning_effort" => form.reasoning_effort = value,
                other => tracing::debug!("Ignoring unknown form field '{}'", other),
            }
        }

        Ok(form)
    }
}

/// Url-encoded body of `POST /api/conversations`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateConversationForm {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub from_response_id: String,
}

/// Url-encoded body of `POST /api/conversations/{id}/continue`.
#[derive(Debug, Default, Deserialize)]
pub struct ContinueConversationForm {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub reasoning_effort: String,
}

/// `?api_key=` query of the read-only routes.
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeyQuery {
    #[serde(default)]
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_trims_and_drops_blank() {
        assert_eq!(present("  sk-test  "), Some("sk-test".to_string()));
        assert_eq!(present("   "), None);
        assert_eq!(present(""), None);
    }

    #[test]
    fn test_parse_effort() {
        assert_eq!(parse_effort("").unwrap(), None);
        assert_eq!(parse_effort(" high ").unwrap(), Some(ReasoningEffort::High));
        assert!(matches!(parse_effort("max"), Err(ApiError::BadRequest(_))));
    }
}
