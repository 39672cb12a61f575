//! Inline image attachments.
//!
//! Raw image bytes become a base64 payload tagged with a MIME type derived
//! from the filename, ready to be embedded in a `data:` URL.

use super::mime::mime_for_filename;
use crate::{Error, Result};
use base64::Engine as _;
use std::path::Path;

/// A base64-encoded image with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Standard (padded) base64 of the image bytes.
    pub data: String,
    /// Always of the form `type/subtype`.
    pub mime_type: String,
}

impl Attachment {
    /// Encode `bytes` as an attachment, deriving the MIME type from `filename`.
    ///
    /// Total over all inputs: empty buffers and unknown extensions are fine.
    pub fn encode(bytes: &[u8], filename: &str) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: mime_for_filename(filename).to_string(),
        }
    }

    /// Read and encode an image from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::MissingAttachmentSource(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)?;
        tracing::debug!("Encoded {} ({} bytes)", path.display(), bytes.len());

        Ok(Self::encode(&bytes, &path.to_string_lossy()))
    }

    /// `data:<mime>;base64,<data>` form accepted by the upstream API.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Where an image in a turn comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Uploaded or on-disk bytes, sent inline.
    Local(Attachment),
    /// Remote image, forwarded as the literal URL.
    Remote(String),
}

impl ImageSource {
    /// URL string placed in the request's image fragment.
    pub fn image_url(&self) -> String {
        match self {
            Self::Local(attachment) => attachment.data_url(),
            Self::Remote(url) => url.clone(),
        }
    }
}

impl From<Attachment> for ImageSource {
    fn from(attachment: Attachment) -> Self {
        Self::Local(attachment)
    }
}
