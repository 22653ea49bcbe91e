//! `train`: spawns the worker in training mode. At most one run at a time.

use std::sync::Arc;

use async_trait::async_trait;
use classibot_core::{Bot, BotConfig, Command, Message, Result};
use tracing::{error, info, instrument};

use crate::state::DispatcherState;
use crate::worker::{relay_output, WorkerRunner};

const MSG_BUSY: &str = "We are already training! Please wait until training has completed";

pub struct TrainCommand {
    bot: Arc<dyn Bot>,
    config: Arc<BotConfig>,
    state: Arc<DispatcherState>,
    runner: Arc<dyn WorkerRunner>,
}

impl TrainCommand {
    pub fn new(
        bot: Arc<dyn Bot>,
        config: Arc<BotConfig>,
        state: Arc<DispatcherState>,
        runner: Arc<dyn WorkerRunner>,
    ) -> Self {
        Self {
            bot,
            config,
            state,
            runner,
        }
    }
}

#[async_trait]
impl Command for TrainCommand {
    fn name(&self) -> &'static str {
        "train"
    }

    fn help(&self) -> &'static str {
        "Train the model using the added images"
    }

    #[instrument(skip(self, message, _args))]
    async fn run(&self, message: &Message, _args: &[String]) -> Result<()> {
        // The guard releases the gate on every path out of this scope,
        // including worker failure.
        let Some(_guard) = self.state.try_begin_training() else {
            return self.bot.send_message(&message.chat, MSG_BUSY).await;
        };

        super::set_status(self.bot.as_ref(), "training...").await;
        info!(chat_id = message.chat.id, "Starting training run");

        let args = vec![
            "--train".to_string(),
            "--interp".to_string(),
            "--num-epochs".to_string(),
            self.config.train_epochs.to_string(),
            "--data-dir".to_string(),
            self.config.save_path.display().to_string(),
        ];

        match self.runner.run(&args).await {
            Ok(output) => relay_output(self.bot.as_ref(), &message.chat, &output).await,
            Err(e) => {
                error!(error = %e, "Training worker failed to run");
                self.bot
                    .send_message(&message.chat, &format!("[stderr]\n{}", e))
                    .await
            }
        }
    }
}
