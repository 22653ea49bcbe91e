//! # Command registry
//!
//! Ordered table of [`Command`] handlers keyed by their leading token. The
//! dispatcher strips the prefix, splits the message, and looks the command up
//! here; insertion order is preserved for help listings.

use std::sync::Arc;

use classibot_core::{Command, Message, Result};
use tracing::{info, instrument, warn};

/// Registry of commands: lookup by name, iteration in registration order.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Appends a command. Later registrations win on duplicate names only in
    /// the sense that lookup returns the first match, so keep names unique.
    pub fn register(mut self, command: Arc<dyn Command>) -> Self {
        self.commands.push(command);
        self
    }

    /// Looks a command up by its token.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.iter().find(|c| c.name() == name)
    }

    /// Commands in registration order (help listing).
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Command>> {
        self.commands.iter()
    }

    /// `(name, help)` pairs in registration order.
    pub fn help_entries(&self) -> Vec<(&'static str, &'static str)> {
        self.commands.iter().map(|c| (c.name(), c.help())).collect()
    }

    /// Dispatches one parsed message: looks up `command` and runs it. Unknown
    /// commands are ignored, matching the original dispatcher.
    #[instrument(skip(self, message, args))]
    pub async fn dispatch(
        &self,
        command: &str,
        message: &Message,
        args: &[String],
    ) -> Result<bool> {
        match self.get(command) {
            Some(handler) => {
                info!(
                    chat_id = message.chat.id,
                    message_id = %message.id,
                    command = %command,
                    "step: command dispatch"
                );
                handler.run(message, args).await?;
                Ok(true)
            }
            None => {
                warn!(
                    chat_id = message.chat.id,
                    command = %command,
                    "Unknown command ignored"
                );
                Ok(false)
            }
        }
    }
}
