//! Wires the command table. The binary calls [`build_registry`] with the
//! long-lived collaborators; tests call it with mocks.

use std::sync::Arc;

use classibot_core::{Bot, BotConfig, Command};
use command_registry::CommandRegistry;
use correlation_store::CorrelationStore;
use image_store::ImageStore;

use crate::commands::{
    AddCommand, ArtifactCommand, DebugCommand, HelpCommand, LsCommand, PredictCommand,
    TrainCommand, UndoCommand,
};
use crate::state::DispatcherState;
use crate::worker::WorkerRunner;

/// Builds the full registry in display order: help, add, undo, ls, train,
/// predict, cm, toploss, debug.
pub fn build_registry(
    bot: Arc<dyn Bot>,
    config: Arc<BotConfig>,
    images: Arc<ImageStore>,
    state: Arc<DispatcherState>,
    store: Arc<dyn CorrelationStore>,
    runner: Arc<dyn WorkerRunner>,
) -> CommandRegistry {
    let commands: Vec<Arc<dyn Command>> = vec![
        Arc::new(AddCommand::new(
            bot.clone(),
            config.clone(),
            images.clone(),
            state.clone(),
        )),
        Arc::new(UndoCommand::new(
            bot.clone(),
            images.clone(),
            state.clone(),
            store,
        )),
        Arc::new(LsCommand::new(bot.clone(), images.clone())),
        Arc::new(TrainCommand::new(
            bot.clone(),
            config.clone(),
            state.clone(),
            runner.clone(),
        )),
        Arc::new(PredictCommand::new(
            bot.clone(),
            config.clone(),
            images.clone(),
            runner,
        )),
        Arc::new(ArtifactCommand::confusion_matrix(
            bot.clone(),
            config.clone(),
            &images,
        )),
        Arc::new(ArtifactCommand::top_losses(
            bot.clone(),
            config.clone(),
            &images,
        )),
        Arc::new(DebugCommand::new(bot.clone(), state)),
    ];

    let help = Arc::new(HelpCommand::new(bot, config, &commands));

    let mut registry = CommandRegistry::new().register(help);
    for command in commands {
        registry = registry.register(command);
    }
    registry
}
