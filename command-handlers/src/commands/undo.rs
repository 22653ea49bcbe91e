//! `undo`: removes the most recent `add`, or, when sent as a reply, an
//! auto-added file recorded in the shared store for that message.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use classibot_core::{Bot, BotError, Command, Message, Result};
use correlation_store::CorrelationStore;
use image_store::{ImageStore, ImageStoreError};
use tracing::{info, instrument, warn};

use crate::state::DispatcherState;

const MSG_DONE: &str = "Complete!";
const MSG_NOTHING: &str = "Nothing to undo...";

pub struct UndoCommand {
    bot: Arc<dyn Bot>,
    images: Arc<ImageStore>,
    state: Arc<DispatcherState>,
    store: Arc<dyn CorrelationStore>,
}

impl UndoCommand {
    pub fn new(
        bot: Arc<dyn Bot>,
        images: Arc<ImageStore>,
        state: Arc<DispatcherState>,
        store: Arc<dyn CorrelationStore>,
    ) -> Self {
        Self {
            bot,
            images,
            state,
            store,
        }
    }

    /// Undo targeted at an earlier message: consult the shared store for an
    /// auto-add record written by the worker.
    async fn undo_auto_add(&self, message: &Message, reply_id: &str) -> Result<()> {
        let added = self
            .store
            .was_auto_added(reply_id)
            .await
            .map_err(|e| BotError::Storage(e.to_string()))?;
        if !added {
            return self.bot.send_message(&message.chat, MSG_NOTHING).await;
        }

        let path = self
            .store
            .auto_added_path(reply_id)
            .await
            .map_err(|e| BotError::Storage(e.to_string()))?;

        if let Some(path) = path {
            match self.images.remove_upload(Path::new(&path)) {
                Ok(()) => {}
                // Already gone on disk; the record is still cleared below.
                Err(ImageStoreError::NotFound(_)) => {
                    warn!(path = %path, "Auto-added file already missing")
                }
                Err(e) => return Err(BotError::Storage(e.to_string())),
            }
        }

        self.store
            .clear_auto_add(reply_id)
            .await
            .map_err(|e| BotError::Storage(e.to_string()))?;
        info!(correlation_id = %reply_id, "Undid auto-add");
        self.bot.send_message(&message.chat, MSG_DONE).await
    }

    /// Plain undo: the dispatcher's own last-saved pointer.
    async fn undo_last_saved(&self, message: &Message) -> Result<()> {
        let Some(path) = self.state.last_saved().await else {
            return self.bot.send_message(&message.chat, MSG_NOTHING).await;
        };

        match self.images.remove_upload(&path) {
            Ok(()) => {
                self.state.clear_last_saved().await;
                self.bot.send_message(&message.chat, MSG_DONE).await
            }
            Err(ImageStoreError::NotFound(_)) => {
                self.state.clear_last_saved().await;
                self.bot.send_message(&message.chat, MSG_NOTHING).await
            }
            Err(e) => Err(BotError::Storage(e.to_string())),
        }
    }
}

#[async_trait]
impl Command for UndoCommand {
    fn name(&self) -> &'static str {
        "undo"
    }

    fn help(&self) -> &'static str {
        "Undo the previous add. Reply to a prediction to undo its automatic add"
    }

    #[instrument(skip(self, message, _args))]
    async fn run(&self, message: &Message, _args: &[String]) -> Result<()> {
        match &message.reply_to_message_id {
            Some(reply_id) => self.undo_auto_add(message, reply_id).await,
            None => self.undo_last_saved(message).await,
        }
    }
}
