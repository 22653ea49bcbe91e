//! `help`: enumerates the command table with config tokens substituted.

use std::sync::Arc;

use async_trait::async_trait;
use classibot_core::{Bot, BotConfig, Command, Message, Result};
use tracing::instrument;

pub(crate) const HELP_INFO: &str = "You are looking at it";

pub struct HelpCommand {
    bot: Arc<dyn Bot>,
    config: Arc<BotConfig>,
    /// `(name, help)` snapshot of the full table, this command included,
    /// taken at wiring time.
    entries: Vec<(&'static str, &'static str)>,
}

impl HelpCommand {
    /// `others` is the rest of the table in display order; help lists itself
    /// first, matching its position in the registry.
    pub fn new(
        bot: Arc<dyn Bot>,
        config: Arc<BotConfig>,
        others: &[Arc<dyn Command>],
    ) -> Self {
        let mut entries = vec![("help", HELP_INFO)];
        entries.extend(others.iter().map(|c| (c.name(), c.help())));
        Self {
            bot,
            config,
            entries,
        }
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn help(&self) -> &'static str {
        HELP_INFO
    }

    #[instrument(skip(self, message, _args))]
    async fn run(&self, message: &Message, _args: &[String]) -> Result<()> {
        let prefix = &self.config.command_prefix;
        let lines: Vec<String> = self
            .entries
            .iter()
            .map(|(name, info)| format!("{}{} - {}", prefix, name, self.config.render(info)))
            .collect();

        self.bot.send_message(&message.chat, &lines.join("\n")).await
    }
}
