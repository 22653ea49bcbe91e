//! One module per chat command. Handlers hold their collaborators behind
//! `Arc` and send replies through the [`classibot_core::Bot`] they were
//! built with.

mod add;
mod artifact;
mod debug;
mod help;
mod ls;
mod predict;
mod train;
mod undo;

pub use add::AddCommand;
pub use artifact::ArtifactCommand;
pub use debug::DebugCommand;
pub use help::HelpCommand;
pub use ls::LsCommand;
pub use predict::PredictCommand;
pub use train::TrainCommand;
pub use undo::UndoCommand;

use classibot_core::Bot;
use tracing::debug;

/// Status updates are cosmetic; a failed update never fails the command.
pub(crate) async fn set_status(bot: &dyn Bot, text: &str) {
    if let Err(e) = bot.set_status(text).await {
        debug!(error = %e, status = %text, "Status update failed");
    }
}
