//! `predict`: saves the attachment under the scratch directory and spawns
//! the worker in inference mode. The message id rides along as the
//! correlation id so the worker can tag auto-add records for this message.

use std::sync::Arc;

use async_trait::async_trait;
use classibot_core::{Bot, BotConfig, BotError, Command, Message, Result};
use image_store::{ImageStore, ImageStoreError};
use tracing::{error, instrument};

use crate::worker::{relay_output, WorkerRunner};

const MSG_NO_ATTACHMENT: &str = "Invalid use of {command_prefix}predict. Usage: {command_prefix}predict <attachment> (No attachment given)";
const MSG_BAD_FILETYPE: &str =
    "Invalid use of {command_prefix}predict. Filetype must be one of {supported_filetypes}";

pub struct PredictCommand {
    bot: Arc<dyn Bot>,
    config: Arc<BotConfig>,
    images: Arc<ImageStore>,
    runner: Arc<dyn WorkerRunner>,
}

impl PredictCommand {
    pub fn new(
        bot: Arc<dyn Bot>,
        config: Arc<BotConfig>,
        images: Arc<ImageStore>,
        runner: Arc<dyn WorkerRunner>,
    ) -> Self {
        Self {
            bot,
            config,
            images,
            runner,
        }
    }
}

#[async_trait]
impl Command for PredictCommand {
    fn name(&self) -> &'static str {
        "predict"
    }

    fn help(&self) -> &'static str {
        "<attachment> - Predict the class of <attachment> using the last trained model. You may omit {command_prefix}predict for this command."
    }

    #[instrument(skip(self, message, _args))]
    async fn run(&self, message: &Message, _args: &[String]) -> Result<()> {
        let Some(attachment) = message.first_attachment() else {
            let reply = self.config.render(MSG_NO_ATTACHMENT);
            return self.bot.send_message(&message.chat, &reply).await;
        };

        super::set_status(self.bot.as_ref(), "predicting...").await;

        let dest = match self.images.stage_predict_upload(&attachment.filename) {
            Ok(dest) => dest,
            Err(ImageStoreError::UnsupportedFiletype(_)) => {
                let reply = self.config.render(MSG_BAD_FILETYPE);
                return self.bot.send_message(&message.chat, &reply).await;
            }
            Err(e) => return Err(BotError::Storage(e.to_string())),
        };

        self.bot.download_attachment(attachment, &dest).await?;

        let mut args = vec![
            "--img-path".to_string(),
            dest.display().to_string(),
            "--data-dir".to_string(),
            self.config.save_path.display().to_string(),
            "--correlation-id".to_string(),
            message.id.clone(),
        ];
        if self.config.enable_auto_class_add {
            args.push("--auto-add-threshold".to_string());
            args.push(self.config.auto_class_add_threshold.to_string());
        }

        match self.runner.run(&args).await {
            Ok(output) => relay_output(self.bot.as_ref(), &message.chat, &output).await,
            Err(e) => {
                error!(error = %e, "Inference worker failed to run");
                self.bot
                    .send_message(&message.chat, &format!("[stderr]\n{}", e))
                    .await
            }
        }
    }
}
