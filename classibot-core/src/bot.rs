//! Bot abstraction for sending replies, shipping image artifacts, and
//! fetching attachments.
//!
//! The trait is transport-agnostic; classibot-telegram implements it via
//! teloxide, tests substitute mocks.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Attachment, Chat};

/// Abstraction over the chat transport. Implementations map to a platform
/// (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a local image file to the given chat (confusion matrix, top
    /// losses).
    async fn send_image(&self, chat: &Chat, path: &Path) -> Result<()>;

    /// Sets the bot's status line ("training...", idle phrases). Best-effort;
    /// callers may ignore failures.
    async fn set_status(&self, text: &str) -> Result<()>;

    /// Downloads an attachment's bytes into `dest`. The parent directory must
    /// already exist.
    async fn download_attachment(&self, attachment: &Attachment, dest: &Path) -> Result<()>;
}
