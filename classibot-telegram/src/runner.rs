//! Dispatch loop: converts teloxide messages to core messages, applies the
//! chat/prefix gate, routes through the command registry, and restores the
//! idle status after each command.

use std::sync::Arc;

use anyhow::Result;
use classibot_core::{Bot as CoreBot, BotConfig, Message};
use command_registry::CommandRegistry;
use rand::seq::IndexedRandom;
use teloxide::prelude::*;
use tracing::{debug, error, info, instrument};

use crate::adapters::TelegramMessageWrapper;

/// Starts the long-poll loop. Each update is converted to a core
/// [`Message`] and routed; command handlers reply through `core_bot`.
#[instrument(skip(bot, config, registry, core_bot))]
pub async fn run_dispatcher(
    bot: teloxide::Bot,
    config: Arc<BotConfig>,
    registry: CommandRegistry,
    core_bot: Arc<dyn CoreBot>,
) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        info!(username = ?me.user.username, "The bot is ready!");
    }
    restore_idle_status(core_bot.as_ref(), &config).await;

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let config = config.clone();
        let registry = registry.clone();
        let core_bot = core_bot.clone();

        async move {
            let core_msg = TelegramMessageWrapper(&msg).to_core();
            handle_message(&registry, &config, core_bot.as_ref(), core_msg).await;
            Ok(())
        }
    })
    .await;

    Ok(())
}

/// One message through the gate and the registry.
async fn handle_message(
    registry: &CommandRegistry,
    config: &BotConfig,
    core_bot: &dyn CoreBot,
    message: Message,
) {
    if message.user.is_bot {
        return;
    }
    if !config.allowed_chats.contains(&message.chat.id) {
        debug!(chat_id = message.chat.id, "Ignoring message outside allowed chats");
        return;
    }

    let has_attachment = !message.attachments.is_empty();
    let Some(parsed) = parse_command(&message.content, &config.command_prefix, has_attachment)
    else {
        return;
    };
    let (command, args) = parsed;

    info!(
        chat_id = message.chat.id,
        message_id = %message.id,
        command = %command,
        has_attachment = has_attachment,
        "Received command"
    );

    if let Err(e) = registry.dispatch(&command, &message, &args).await {
        error!(error = %e, chat_id = message.chat.id, command = %command, "Command failed");
    }

    restore_idle_status(core_bot, config).await;
}

/// Splits a message into command token and args. Prefixed text is a command;
/// a bare attachment with no text defaults to `predict`; anything else is not
/// for us.
fn parse_command(
    content: &str,
    prefix: &str,
    has_attachment: bool,
) -> Option<(String, Vec<String>)> {
    let body = match content.strip_prefix(prefix) {
        Some(rest) => rest.to_lowercase(),
        None if has_attachment && content.is_empty() => String::new(),
        None => return None,
    };

    let mut tokens = body.split_whitespace();
    let command = tokens.next().unwrap_or("predict").to_string();
    let args: Vec<String> = tokens.map(|t| t.to_string()).collect();
    Some((command, args))
}

/// Best-effort idle status from the configured phrases.
async fn restore_idle_status(bot: &dyn CoreBot, config: &BotConfig) {
    let phrase = config
        .idle_status_options
        .choose(&mut rand::rng())
        .cloned();
    if let Some(phrase) = phrase {
        if let Err(e) = bot.set_status(&phrase).await {
            debug!(error = %e, "Idle status update failed");
        }
    }
}
