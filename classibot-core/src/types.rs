//! Core types: user, chat, message, attachment, and the Command trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identity (id plus optional username).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub is_bot: bool,
}

/// Chat (channel or private) identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub chat_type: String,
}

/// An uploaded file attached to a message. `file_id` is the transport handle
/// used to fetch the bytes; `filename` is what the uploader called it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub file_id: String,
    pub filename: String,
}

/// A single inbound message with chat, text content, and attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    /// Id of the message this one replies to, if any. Drives the
    /// reply-based undo of auto-added files.
    pub reply_to_message_id: Option<String>,
}

impl Message {
    /// First attachment, if any. Commands consume at most one.
    pub fn first_attachment(&self) -> Option<&Attachment> {
        self.attachments.first()
    }
}

/// A named chat command with a help line. Handlers send their own replies via
/// the [`crate::Bot`] they hold; the dispatcher only routes.
#[async_trait]
pub trait Command: Send + Sync {
    /// Command token as typed after the prefix (e.g. `add`).
    fn name(&self) -> &'static str;
    /// One-line help text. May contain `{command_prefix}` and
    /// `{supported_filetypes}` tokens substituted at render time.
    fn help(&self) -> &'static str;
    /// Executes the command for one message.
    async fn run(&self, message: &Message, args: &[String]) -> crate::error::Result<()>;
}
