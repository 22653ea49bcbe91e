//! `add <class>`: files an attached image into the training set.

use std::sync::Arc;

use async_trait::async_trait;
use classibot_core::{Bot, BotConfig, BotError, Command, Message, Result};
use image_store::{ImageStore, ImageStoreError};
use tracing::{info, instrument};

use crate::state::DispatcherState;

const MSG_NO_ATTACHMENT: &str = "Invalid use of {command_prefix}add. Usage: {command_prefix}add <class> <attachment> (No attachment given)";
const MSG_NO_CLASS: &str = "Invalid use of {command_prefix}add. Usage: {command_prefix}add <class> <attachment> (No class given)";
const MSG_BAD_FILETYPE: &str =
    "Invalid use of {command_prefix}add. Filetype must be one of {supported_filetypes}";
const MSG_BAD_CLASS: &str = "Invalid use of {command_prefix}add. That class name is not allowed";

pub struct AddCommand {
    bot: Arc<dyn Bot>,
    config: Arc<BotConfig>,
    images: Arc<ImageStore>,
    state: Arc<DispatcherState>,
}

impl AddCommand {
    pub fn new(
        bot: Arc<dyn Bot>,
        config: Arc<BotConfig>,
        images: Arc<ImageStore>,
        state: Arc<DispatcherState>,
    ) -> Self {
        Self {
            bot,
            config,
            images,
            state,
        }
    }
}

#[async_trait]
impl Command for AddCommand {
    fn name(&self) -> &'static str {
        "add"
    }

    fn help(&self) -> &'static str {
        "<class> <attachment> - Add an image for training"
    }

    #[instrument(skip(self, message, args))]
    async fn run(&self, message: &Message, args: &[String]) -> Result<()> {
        super::set_status(self.bot.as_ref(), "Adding image...").await;

        let Some(attachment) = message.first_attachment() else {
            let reply = self.config.render(MSG_NO_ATTACHMENT);
            return self.bot.send_message(&message.chat, &reply).await;
        };

        let Some(class) = args.first() else {
            let reply = self.config.render(MSG_NO_CLASS);
            return self.bot.send_message(&message.chat, &reply).await;
        };

        let dest = match self.images.stage_train_upload(class, &attachment.filename) {
            Ok(dest) => dest,
            Err(ImageStoreError::UnsupportedFiletype(_)) => {
                let reply = self.config.render(MSG_BAD_FILETYPE);
                return self.bot.send_message(&message.chat, &reply).await;
            }
            Err(ImageStoreError::InvalidClass(_)) => {
                let reply = self.config.render(MSG_BAD_CLASS);
                return self.bot.send_message(&message.chat, &reply).await;
            }
            Err(e) => return Err(BotError::Storage(e.to_string())),
        };

        self.bot.download_attachment(attachment, &dest).await?;
        self.state.record_saved(dest.clone()).await;

        info!(
            chat_id = message.chat.id,
            class = %class,
            dest = %dest.display(),
            "Added training image"
        );
        Ok(())
    }
}
