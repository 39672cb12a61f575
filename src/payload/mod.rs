//! Payload construction and normalisation
//!
//! Turns user text and images into the upstream `input` shape, and turns
//! upstream replies back into plain text. Everything here is pure and
//! stateless, so it is safe to call concurrently from any task.

pub mod attachment;
pub mod mime;
pub mod reply;
pub mod request;

pub use attachment::{Attachment, ImageSource};
pub use mime::{mime_for_filename, DEFAULT_IMAGE_MIME};
pub use reply::{extract_text, ContentFragment, Item, MessageItem, Reply};
pub use request::{build_request, InputContent, InputMessage, MessageInput, Role};
