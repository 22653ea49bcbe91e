//! # classibot-core
//!
//! Core types and traits for the classifier bot: [`Bot`], [`Command`], message and
//! attachment types, configuration, errors, and tracing initialization.
//! Transport-agnostic; used by classibot-telegram, command-registry, and command-handlers.

pub mod bot;
pub mod config;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use config::BotConfig;
pub use error::{BotError, Result};
pub use logger::init_tracing;
pub use types::{Attachment, Chat, Command, Message, User};
