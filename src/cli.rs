//! Command-line adapters: one-shot continuation and the interactive chat loop.

use crate::ai::openai::ReasoningEffort;
use crate::ai::ResponsesApi;
use crate::payload::{Attachment, ImageSource};
use crate::turn::{send_turn, ConversationLink, TurnReply, TurnRequest};
use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One line of chat input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Blank line; nothing to do.
    Empty,
    Quit,
    ShowId,
    Clear,
    AttachImage(String),
    AttachUrl(String),
    Message(String),
}

impl ChatCommand {
    /// Commands match case-insensitively; arguments keep their case.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let lower = line.to_lowercase();
        match lower.as_str() {
            "quit" | "exit" | "q" => return Self::Quit,
            "/id" => return Self::ShowId,
            "/clear" => return Self::Clear,
            _ => {}
        }

        if lower.starts_with("/image ") {
            return Self::AttachImage(line["/image ".len()..].trim().to_string());
        }
        if lower.starts_with("/url ") {
            return Self::AttachUrl(line["/url ".len()..].trim().to_string());
        }

        Self::Message(line.to_string())
    }
}

/// Per-turn options shared by both CLI modes.
#[derive(Debug, Clone)]
pub struct TurnOptions {
    pub model: String,
    pub reasoning_effort: Option<ReasoningEffort>,
    pub instructions: Option<String>,
}

impl TurnOptions {
    fn request(&self, text: &str, images: Vec<ImageSource>, response_id: &str) -> TurnRequest {
        TurnRequest::new(self.model.clone(), text)
            .with_images(images)
            .with_link(Some(ConversationLink::PreviousResponse(
                response_id.to_string(),
            )))
            .with_reasoning_effort(self.reasoning_effort)
            .with_instructions(self.instructions.clone())
    }
}

/// Encode local files first, then remote URLs.
fn collect_images(paths: &[PathBuf], urls: &[String]) -> Result<Vec<ImageSource>> {
    let mut images = Vec::with_capacity(paths.len() + urls.len());
    for path in paths {
        images.push(ImageSource::Local(Attachment::from_path(path)?));
    }
    images.extend(urls.iter().cloned().map(ImageSource::Remote));
    Ok(images)
}

/// Send a single turn continuing from `response_id`.
pub async fn run_continue(
    api: &dyn ResponsesApi,
    response_id: &str,
    message: &str,
    options: &TurnOptions,
    image_paths: &[PathBuf],
    image_urls: &[String],
) -> Result<TurnReply> {
    let images = collect_images(image_paths, image_urls)?;
    let request = options.request(message.trim(), images, response_id);
    if request.is_empty() {
        return Err(Error::InvalidInput("Message or images required".to_string()));
    }

    send_turn(api, &request).await
}

/// State of an interactive chat: the id to continue from and queued attachments.
#[derive(Debug)]
pub struct ChatSession {
    current_response_id: String,
    options: TurnOptions,
    pending_images: Vec<PathBuf>,
    pending_urls: Vec<String>,
}

impl ChatSession {
    pub fn new(response_id: impl Into<String>, options: TurnOptions) -> Self {
        Self {
            current_response_id: response_id.into(),
            options,
            pending_images: Vec::new(),
            pending_urls: Vec::new(),
        }
    }

    pub fn current_response_id(&self) -> &str {
        &self.current_response_id
    }

    pub fn pending(&self) -> (usize, usize) {
        (self.pending_images.len(), self.pending_urls.len())
    }

    /// Queue a local image; the file must exist now.
    pub fn queue_image(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::MissingAttachmentSource(path.to_path_buf()));
        }
        self.pending_images.push(path.to_path_buf());
        Ok(())
    }

    pub fn queue_url(&mut self, url: impl Into<String>) {
        self.pending_urls.push(url.into());
    }

    pub fn clear(&mut self) {
        self.pending_images.clear();
        self.pending_urls.clear();
    }

    /// Send `text` with every pending attachment.
    ///
    /// Attachments are consumed whether or not the call succeeds; the current
    /// response id only advances on success.
    pub async fn send(&mut self, api: &dyn ResponsesApi, text: &str) -> Result<TurnReply> {
        let paths = std::mem::take(&mut self.pending_images);
        let urls = std::mem::take(&mut self.pending_urls);
        let images = collect_images(&paths, &urls)?;

        let request = self
            .options
            .request(text, images, &self.current_response_id);
        let reply = send_turn(api, &request).await?;

        self.current_response_id = reply.response_id.clone();
        Ok(reply)
    }
}

/// Drive a chat session from `input` until EOF or a quit command.
///
/// Returns the final response id.
pub async fn run_chat<R, W>(
    api: &dyn ResponsesApi,
    session: &mut ChatSession,
    input: R,
    out: &mut W,
) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    print_banner(session, out)?;
    let mut lines = input.lines();

    loop {
        let (images, urls) = session.pending();
        if images + urls > 0 {
            writeln!(out, "  Pending: {} image(s), {} URL(s)", images, urls)?;
        }
        write!(out, "\nYou: ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out, "\nGoodbye!")?;
            break;
        };

        match ChatCommand::parse(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Quit => {
                writeln!(out, "\nFinal response ID: {}", session.current_response_id())?;
                break;
            }
            ChatCommand::ShowId => {
                writeln!(out, "Current response ID: {}", session.current_response_id())?;
            }
            ChatCommand::Clear => {
                session.clear();
                writeln!(out, "Attachments cleared.")?;
            }
            ChatCommand::AttachImage(path) => match session.queue_image(&path) {
                Ok(()) => writeln!(out, "  Queued: {}", path)?,
                Err(_) => writeln!(out, "  File not found: {}", path)?,
            },
            ChatCommand::AttachUrl(url) => {
                writeln!(out, "  Queued URL: {}", url)?;
                session.queue_url(url);
            }
            ChatCommand::Message(text) => {
                if images + urls > 0 {
                    writeln!(out, "  Sending with {} attachment(s)...", images + urls)?;
                }
                match session.send(api, &text).await {
                    Ok(reply) => writeln!(out, "Assistant: {}", reply.text)?,
                    Err(e) => {
                        tracing::warn!("Chat turn failed: {}", e);
                        writeln!(out, "\nError: {}", e)?;
                        writeln!(out, "(Conversation state preserved, try again)")?;
                    }
                }
            }
        }
    }

    Ok(session.current_response_id().to_string())
}

fn print_banner<W: Write>(session: &ChatSession, out: &mut W) -> Result<()> {
    let rule = "=".repeat(60);
    writeln!(out, "{}", rule)?;
    writeln!(
        out,
        "Continuing conversation from: {}",
        session.current_response_id()
    )?;
    writeln!(out, "Model: {}", session.options.model)?;
    if let Some(effort) = session.options.reasoning_effort {
        writeln!(out, "Reasoning effort: {}", effort.as_str())?;
    }
    writeln!(out, "{}", rule)?;
    writeln!(out, "Commands:")?;
    writeln!(out, "  /image <path>  - Attach a local image")?;
    writeln!(out, "  /url <url>     - Attach an image URL")?;
    writeln!(out, "  /clear         - Clear pending attachments")?;
    writeln!(out, "  /id            - Show current response ID")?;
    writeln!(out, "  quit/exit/q    - End session")?;
    writeln!(out, "{}", "-".repeat(60))?;
    Ok(())
}
