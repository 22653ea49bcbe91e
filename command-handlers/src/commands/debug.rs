//! `debug`: uptime plus host memory and GPU status via shell introspection.

use std::sync::Arc;

use async_trait::async_trait;
use classibot_core::{Bot, Command, Message, Result};
use tracing::instrument;

use crate::state::DispatcherState;
use crate::worker::shell_output;

pub struct DebugCommand {
    bot: Arc<dyn Bot>,
    state: Arc<DispatcherState>,
}

impl DebugCommand {
    pub fn new(bot: Arc<dyn Bot>, state: Arc<DispatcherState>) -> Self {
        Self { bot, state }
    }
}

#[async_trait]
impl Command for DebugCommand {
    fn name(&self) -> &'static str {
        "debug"
    }

    fn help(&self) -> &'static str {
        "sends debug information"
    }

    #[instrument(skip(self, message, _args))]
    async fn run(&self, message: &Message, _args: &[String]) -> Result<()> {
        let mut msgs = Vec::new();

        let uptime = self.state.uptime().as_secs();
        msgs.push(format!(
            "Uptime: {}:{:02}:{:02}",
            uptime / 3600,
            (uptime % 3600) / 60,
            uptime % 60
        ));

        let mem = shell_output("grep MemAvailable /proc/meminfo").await?;
        msgs.push(mem.stdout.trim_end().to_string());

        let gpu = shell_output("nvidia-smi").await?;
        msgs.push(gpu.stdout.trim_end().to_string());

        self.bot.send_message(&message.chat, &msgs.join("\n")).await
    }
}
