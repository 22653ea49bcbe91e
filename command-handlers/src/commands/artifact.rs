//! `cm` / `toploss`: send a training artifact image if it has been
//! generated.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use classibot_core::{Bot, BotConfig, Command, Message, Result};
use image_store::ImageStore;
use tracing::instrument;

const MSG_CM_MISSING: &str = "Confusion matrix not found! Run {command_prefix}train first.";
const MSG_TOPLOSS_MISSING: &str = "Top losses not found! Run {command_prefix}train first.";

/// One command per generated artifact; both share the send-or-apologize
/// behavior.
pub struct ArtifactCommand {
    bot: Arc<dyn Bot>,
    config: Arc<BotConfig>,
    name: &'static str,
    help: &'static str,
    path: PathBuf,
    missing: &'static str,
}

impl ArtifactCommand {
    pub fn confusion_matrix(
        bot: Arc<dyn Bot>,
        config: Arc<BotConfig>,
        images: &ImageStore,
    ) -> Self {
        Self {
            bot,
            config,
            name: "cm",
            help: "Shows a confusion matrix on the validation set",
            path: images.confusion_matrix_path(),
            missing: MSG_CM_MISSING,
        }
    }

    pub fn top_losses(bot: Arc<dyn Bot>, config: Arc<BotConfig>, images: &ImageStore) -> Self {
        Self {
            bot,
            config,
            name: "toploss",
            help: "Shows a heatmap of the top losses",
            path: images.top_losses_path(),
            missing: MSG_TOPLOSS_MISSING,
        }
    }
}

#[async_trait]
impl Command for ArtifactCommand {
    fn name(&self) -> &'static str {
        self.name
    }

    fn help(&self) -> &'static str {
        self.help
    }

    #[instrument(skip(self, message, _args))]
    async fn run(&self, message: &Message, _args: &[String]) -> Result<()> {
        if self.path.exists() {
            self.bot.send_image(&message.chat, &self.path).await
        } else {
            let reply = self.config.render(self.missing);
            self.bot.send_message(&message.chat, &reply).await
        }
    }
}
