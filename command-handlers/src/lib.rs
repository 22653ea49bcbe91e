//! # command-handlers
//!
//! The bot's chat commands (help, add, undo, ls, train, predict, cm, toploss,
//! debug), the dispatcher-owned state they share, and the worker-spawning
//! seam. Wiring lives in [`components`]; the transport layer only sees the
//! resulting [`command_registry::CommandRegistry`].

pub mod commands;
pub mod components;
pub mod state;
pub mod worker;

pub use commands::{
    AddCommand, ArtifactCommand, DebugCommand, HelpCommand, LsCommand, PredictCommand,
    TrainCommand, UndoCommand,
};
pub use components::build_registry;
pub use state::{DispatcherState, TrainingGuard};
pub use worker::{relay_output, shell_output, ProcessWorkerRunner, WorkerOutput, WorkerRunner};
