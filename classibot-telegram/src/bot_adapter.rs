//! Wraps teloxide::Bot and implements [`classibot_core::Bot`]. Production
//! code talks to Telegram; tests substitute another Bot impl.

use std::path::Path;

use async_trait::async_trait;
use classibot_core::{Attachment, Bot as CoreBot, BotError, Chat, Result};
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatId, FileId, InputFile};

/// Thin wrapper around teloxide::Bot implementing core's Bot trait.
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(())
    }

    async fn send_image(&self, chat: &Chat, path: &Path) -> Result<()> {
        self.bot
            .send_photo(ChatId(chat.id), InputFile::file(path.to_path_buf()))
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(())
    }

    async fn set_status(&self, text: &str) -> Result<()> {
        // Telegram has no presence; the bot's short description is the
        // closest visible status line.
        self.bot
            .set_my_short_description()
            .short_description(text.to_string())
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(())
    }

    async fn download_attachment(&self, attachment: &Attachment, dest: &Path) -> Result<()> {
        let file = self
            .bot
            .get_file(FileId(attachment.file_id.clone()))
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        let mut dst = tokio::fs::File::create(dest).await?;
        self.bot
            .download_file(&file.path, &mut dst)
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(())
    }
}
