//! `ls`: lists the known classes and how many images each holds.

use std::sync::Arc;

use async_trait::async_trait;
use classibot_core::{Bot, BotError, Command, Message, Result};
use image_store::ImageStore;
use tracing::instrument;

const MSG_EMPTY: &str = "No items yet!";

pub struct LsCommand {
    bot: Arc<dyn Bot>,
    images: Arc<ImageStore>,
}

impl LsCommand {
    pub fn new(bot: Arc<dyn Bot>, images: Arc<ImageStore>) -> Self {
        Self { bot, images }
    }
}

#[async_trait]
impl Command for LsCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn help(&self) -> &'static str {
        "View the current classes and the number of images per class"
    }

    #[instrument(skip(self, message, _args))]
    async fn run(&self, message: &Message, _args: &[String]) -> Result<()> {
        let classes = self
            .images
            .list_classes()
            .map_err(|e| BotError::Storage(e.to_string()))?;

        if classes.is_empty() {
            return self.bot.send_message(&message.chat, MSG_EMPTY).await;
        }

        let lines: Vec<String> = classes
            .iter()
            .map(|c| {
                let img_txt = if c.count == 1 { "image" } else { "images" };
                format!("{} - {} {}", c.name, c.count, img_txt)
            })
            .collect();

        self.bot.send_message(&message.chat, &lines.join("\n")).await
    }
}
