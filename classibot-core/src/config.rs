//! Bot configuration: chat access, image storage, worker and store settings.
//! Loaded from environment variables (load `.env` with dotenvy before calling
//! [`BotConfig::load`]).

use std::env;
use std::path::PathBuf;

use anyhow::Result;

/// Full dispatcher configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// BOT_TOKEN
    pub bot_token: String,
    /// SAVE_PATH: root of the image tree (train/, predict/, artifacts)
    pub save_path: PathBuf,
    /// COMMAND_PREFIX: leading character that marks a command
    pub command_prefix: String,
    /// ALLOWED_CHATS: chat ids the bot serves, comma-separated
    pub allowed_chats: Vec<i64>,
    /// SUPPORTED_FILETYPES: accepted upload extensions, comma-separated
    pub supported_filetypes: Vec<String>,
    /// IDLE_STATUS_OPTIONS: phrases shown while the bot is idle
    pub idle_status_options: Vec<String>,
    /// ENABLE_AUTO_CLASS_ADD: auto-file confident predictions into the training set
    pub enable_auto_class_add: bool,
    /// AUTO_CLASS_ADD_THRESHOLD: confidence needed for an auto-add
    pub auto_class_add_threshold: f64,
    /// TRAIN_EPOCHS: epoch count passed to the worker
    pub train_epochs: u32,
    /// LEARNER_COMMAND: program spawned for training/inference
    pub learner_command: String,
    /// REDIS_HOST / REDIS_PORT: shared correlation store
    pub redis_host: String,
    pub redis_port: u16,
    /// LOG_FILE: optional tracing tee target
    pub log_file: Option<String>,
}

impl BotConfig {
    /// Loads from environment variables. `token` overrides BOT_TOKEN if
    /// provided. Call [`BotConfig::validate`] after load to fail fast.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(t) => t,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let save_path = env::var("SAVE_PATH")
            .map_err(|_| anyhow::anyhow!("SAVE_PATH not set"))?
            .into();
        let command_prefix = env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!".to_string());
        let allowed_chats = csv(&env::var("ALLOWED_CHATS").unwrap_or_default())
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        let supported_filetypes = csv(
            &env::var("SUPPORTED_FILETYPES").unwrap_or_else(|_| ".jpg,.png,.jpeg".to_string()),
        )
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
        let idle_status_options = csv(
            &env::var("IDLE_STATUS_OPTIONS").unwrap_or_else(|_| "Doing nothing...,Idle".to_string()),
        );
        let enable_auto_class_add = env::var("ENABLE_AUTO_CLASS_ADD")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let auto_class_add_threshold = env::var("AUTO_CLASS_ADD_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.9);
        let train_epochs = env::var("TRAIN_EPOCHS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);
        let learner_command =
            env::var("LEARNER_COMMAND").unwrap_or_else(|_| "learner".to_string());
        let redis_host = env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string());
        let redis_port = env::var("REDIS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(6379);
        let log_file = env::var("LOG_FILE").ok();

        Ok(Self {
            bot_token,
            save_path,
            command_prefix,
            allowed_chats,
            supported_filetypes,
            idle_status_options,
            enable_auto_class_add,
            auto_class_add_threshold,
            train_epochs,
            learner_command,
            redis_host,
            redis_port,
            log_file,
        })
    }

    /// Validates loaded values. Call after load() to fail before init.
    pub fn validate(&self) -> Result<()> {
        if self.command_prefix.chars().count() != 1 {
            anyhow::bail!(
                "COMMAND_PREFIX must be a single character, got {:?}",
                self.command_prefix
            );
        }
        if self.allowed_chats.is_empty() {
            anyhow::bail!("ALLOWED_CHATS must list at least one chat id");
        }
        if self.supported_filetypes.is_empty() {
            anyhow::bail!("SUPPORTED_FILETYPES must list at least one extension");
        }
        if !(0.0..=1.0).contains(&self.auto_class_add_threshold) {
            anyhow::bail!(
                "AUTO_CLASS_ADD_THRESHOLD must be within 0..=1, got {}",
                self.auto_class_add_threshold
            );
        }
        Ok(())
    }

    /// Substitutes config tokens into a message template.
    /// `"Run {command_prefix}train first"` becomes `"Run !train first"`.
    pub fn render(&self, template: &str) -> String {
        template
            .replace("{command_prefix}", &self.command_prefix)
            .replace("{supported_filetypes}", &self.supported_filetypes.join(", "))
    }

    /// Connection URL for the shared correlation store.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}", self.redis_host, self.redis_port)
    }
}

fn csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
