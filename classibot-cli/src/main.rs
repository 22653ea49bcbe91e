//! classibot CLI: run the dispatcher. Config from env and optional CLI args.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use classibot_core::{init_tracing, Bot, BotConfig};
use classibot_telegram::{run_dispatcher, TelegramBotAdapter};
use command_handlers::{build_registry, DispatcherState, ProcessWorkerRunner};
use correlation_store::{CorrelationStore, RedisCorrelationStore};
use image_store::ImageStore;

#[derive(Parser)]
#[command(name = "classibot")]
#[command(about = "Image-classifier chat bot dispatcher", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => run(token).await,
    }
}

async fn run(token: Option<String>) -> Result<()> {
    let config = BotConfig::load(token).context("Load config from environment")?;
    config.validate()?;
    init_tracing(config.log_file.as_deref())?;

    info!(
        save_path = %config.save_path.display(),
        allowed_chats = ?config.allowed_chats,
        "Initializing bot"
    );

    let store = RedisCorrelationStore::connect(&config.redis_url())
        .await
        .context("Connect to the shared correlation store (REDIS_HOST/REDIS_PORT)")?;

    let config = Arc::new(config);
    let images = Arc::new(ImageStore::new(
        &config.save_path,
        config.supported_filetypes.clone(),
    ));
    let state = Arc::new(DispatcherState::new());
    let runner = Arc::new(ProcessWorkerRunner::new(config.learner_command.clone()));

    let bot = teloxide::Bot::new(config.bot_token.clone());
    let core_bot: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(bot.clone()));

    let registry = build_registry(
        core_bot.clone(),
        config.clone(),
        images,
        state,
        Arc::new(store) as Arc<dyn CorrelationStore>,
        runner,
    );

    run_dispatcher(bot, config, registry, core_bot).await
}
