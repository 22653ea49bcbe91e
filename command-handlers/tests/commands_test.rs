//! Integration tests for the command handlers.
//!
//! Covers: upload validation leaving the filesystem unchanged, the add/undo
//! pointer lifecycle, ls wording and exclusions, the training gate under
//! concurrency, predict argument plumbing and output relay, reply-based undo
//! of auto-adds, and help rendering.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use classibot_core::{Attachment, Bot, BotConfig, Chat, Message, Result, User};
use command_handlers::{build_registry, DispatcherState, WorkerOutput, WorkerRunner};
use command_registry::CommandRegistry;
use correlation_store::{CorrelationStore, InMemoryCorrelationStore};
use image_store::ImageStore;

// --- Mocks ---

struct MockBot {
    sent: Mutex<Vec<String>>,
}

impl MockBot {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, _chat: &Chat, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn send_image(&self, _chat: &Chat, path: &Path) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push(format!("<image:{}>", path.display()));
        Ok(())
    }

    async fn set_status(&self, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn download_attachment(&self, _attachment: &Attachment, dest: &Path) -> Result<()> {
        std::fs::write(dest, b"testimage")?;
        Ok(())
    }
}

struct MockWorkerRunner {
    calls: Mutex<Vec<Vec<String>>>,
    output: WorkerOutput,
    delay: Option<Duration>,
}

impl MockWorkerRunner {
    fn new(output: WorkerOutput) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            output,
            delay: None,
        }
    }

    fn with_delay(output: WorkerOutput, delay: Duration) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            output,
            delay: Some(delay),
        }
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkerRunner for MockWorkerRunner {
    async fn run(&self, args: &[String]) -> Result<WorkerOutput> {
        self.calls.lock().unwrap().push(args.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.output.clone())
    }
}

// --- Fixture ---

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
    registry: CommandRegistry,
    bot: Arc<MockBot>,
    state: Arc<DispatcherState>,
    store: Arc<InMemoryCorrelationStore>,
    runner: Arc<MockWorkerRunner>,
    images: Arc<ImageStore>,
}

fn test_config(save_path: &Path) -> BotConfig {
    BotConfig {
        bot_token: "token".to_string(),
        save_path: save_path.to_path_buf(),
        command_prefix: "!".to_string(),
        allowed_chats: vec![456],
        supported_filetypes: vec![".jpg".to_string(), ".png".to_string(), ".jpeg".to_string()],
        idle_status_options: vec!["Idle".to_string()],
        enable_auto_class_add: true,
        auto_class_add_threshold: 0.9,
        train_epochs: 5,
        learner_command: "learner".to_string(),
        redis_host: "localhost".to_string(),
        redis_port: 6379,
        log_file: None,
    }
}

fn fixture_with_runner(runner: MockWorkerRunner) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let config = Arc::new(test_config(&root));
    let bot = Arc::new(MockBot::new());
    let images = Arc::new(ImageStore::new(
        &root,
        config.supported_filetypes.clone(),
    ));
    let state = Arc::new(DispatcherState::new());
    let store = Arc::new(InMemoryCorrelationStore::new());
    let runner = Arc::new(runner);

    let registry = build_registry(
        bot.clone(),
        config,
        images.clone(),
        state.clone(),
        store.clone() as Arc<dyn CorrelationStore>,
        runner.clone(),
    );

    Fixture {
        _dir: dir,
        root,
        registry,
        bot,
        state,
        store,
        runner,
        images,
    }
}

fn fixture() -> Fixture {
    fixture_with_runner(MockWorkerRunner::new(WorkerOutput::default()))
}

fn message(content: &str, attachments: Vec<Attachment>) -> Message {
    Message {
        id: "100".to_string(),
        user: User {
            id: 123,
            username: Some("test_user".to_string()),
            is_bot: false,
        },
        chat: Chat {
            id: 456,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        attachments,
        created_at: Utc::now(),
        reply_to_message_id: None,
    }
}

fn png_attachment(name: &str) -> Attachment {
    Attachment {
        file_id: "file-1".to_string(),
        filename: name.to_string(),
    }
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// --- add / undo ---

/// **Test: add saves under train/<class>/<timestamp>_<name> and records the
/// pointer; undo deletes exactly that file; a second undo is a no-op reply.**
#[tokio::test]
async fn test_add_then_undo_lifecycle() {
    let fx = fixture();
    let msg = message("add cats", vec![png_attachment("cat.png")]);

    fx.registry
        .dispatch("add", &msg, &args(&["cats"]))
        .await
        .unwrap();

    let saved = fx.state.last_saved().await.expect("pointer recorded");
    assert!(saved.starts_with(fx.root.join("train/cats")));
    assert!(saved
        .file_name()
        .unwrap()
        .to_string_lossy()
        .ends_with("_cat.png"));
    assert!(saved.exists());
    // A successful add replies with nothing; the status line carries the work.
    assert!(fx.bot.sent().is_empty());

    let undo_msg = message("undo", vec![]);
    fx.registry.dispatch("undo", &undo_msg, &[]).await.unwrap();
    assert!(!saved.exists());
    assert_eq!(fx.state.last_saved().await, None);
    assert_eq!(fx.bot.sent(), vec!["Complete!"]);

    fx.registry.dispatch("undo", &undo_msg, &[]).await.unwrap();
    assert_eq!(fx.bot.sent().last().unwrap(), "Nothing to undo...");
}

/// **Test: add without attachment replies with the usage error and leaves the
/// filesystem unchanged.**
#[tokio::test]
async fn test_add_without_attachment_is_rejected() {
    let fx = fixture();
    let msg = message("add cats", vec![]);

    fx.registry
        .dispatch("add", &msg, &args(&["cats"]))
        .await
        .unwrap();

    assert!(fx.bot.sent()[0].contains("(No attachment given)"));
    assert!(!fx.root.join("train").exists());
    assert_eq!(fx.state.last_saved().await, None);
}

/// **Test: add without a class argument replies with the usage error.**
#[tokio::test]
async fn test_add_without_class_is_rejected() {
    let fx = fixture();
    let msg = message("add", vec![png_attachment("cat.png")]);

    fx.registry.dispatch("add", &msg, &[]).await.unwrap();

    assert!(fx.bot.sent()[0].contains("(No class given)"));
    assert!(!fx.root.join("train").exists());
}

/// **Test: unsupported extension is rejected for add with no side effects,
/// with the allow-list in the reply.**
#[tokio::test]
async fn test_add_rejects_unsupported_extension() {
    let fx = fixture();
    let msg = message("add cats", vec![png_attachment("cat.gif")]);

    fx.registry
        .dispatch("add", &msg, &args(&["cats"]))
        .await
        .unwrap();

    let sent = fx.bot.sent();
    assert!(sent[0].contains("Filetype must be one of .jpg, .png, .jpeg"));
    assert!(!fx.root.join("train/cats").exists());
    assert_eq!(fx.state.last_saved().await, None);
}

// --- ls ---

/// **Test: ls lists only non-empty class dirs, excludes models/, and uses
/// singular/plural wording.**
#[tokio::test]
async fn test_ls_wording_and_exclusions() {
    let fx = fixture();
    std::fs::create_dir_all(fx.root.join("train/cats")).unwrap();
    std::fs::create_dir_all(fx.root.join("train/dogs")).unwrap();
    std::fs::create_dir_all(fx.root.join("train/models")).unwrap();
    std::fs::create_dir_all(fx.root.join("train/empty")).unwrap();
    std::fs::write(fx.root.join("train/cats/a.jpg"), b"x").unwrap();
    std::fs::write(fx.root.join("train/cats/b.jpg"), b"x").unwrap();
    std::fs::write(fx.root.join("train/dogs/a.jpg"), b"x").unwrap();
    std::fs::write(fx.root.join("train/models/m.json"), b"x").unwrap();

    let msg = message("ls", vec![]);
    fx.registry.dispatch("ls", &msg, &[]).await.unwrap();

    assert_eq!(fx.bot.sent(), vec!["cats - 2 images\ndogs - 1 image"]);
}

/// **Test: ls with no classes yet replies "No items yet!".**
#[tokio::test]
async fn test_ls_empty_tree() {
    let fx = fixture();
    let msg = message("ls", vec![]);
    fx.registry.dispatch("ls", &msg, &[]).await.unwrap();
    assert_eq!(fx.bot.sent(), vec!["No items yet!"]);
}

// --- train ---

/// **Test: a second train while one is running is rejected without spawning a
/// second worker; the gate is clear after completion.**
#[tokio::test]
async fn test_train_gate_rejects_concurrent_run() {
    let fx = fixture_with_runner(MockWorkerRunner::with_delay(
        WorkerOutput {
            stdout: "done".to_string(),
            stderr: String::new(),
        },
        Duration::from_millis(200),
    ));

    let registry = fx.registry.clone();
    let msg = message("train", vec![]);
    let first = {
        let registry = registry.clone();
        let msg = msg.clone();
        tokio::spawn(async move { registry.dispatch("train", &msg, &[]).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(fx.state.is_training());
    fx.registry.dispatch("train", &msg, &[]).await.unwrap();
    assert!(fx
        .bot
        .sent()
        .contains(&"We are already training! Please wait until training has completed".to_string()));

    first.await.unwrap().unwrap();
    assert!(!fx.state.is_training());
    assert_eq!(fx.runner.calls().len(), 1);
    assert!(fx.bot.sent().contains(&"done".to_string()));
}

/// **Test: train passes mode, interp, epochs and data dir to the worker and
/// relays stderr with the marker prefix.**
#[tokio::test]
async fn test_train_worker_args_and_stderr_relay() {
    let fx = fixture_with_runner(MockWorkerRunner::new(WorkerOutput {
        stdout: "classes: [\"cats\", \"dogs\"]".to_string(),
        stderr: "warning: small dataset".to_string(),
    }));

    let msg = message("train", vec![]);
    fx.registry.dispatch("train", &msg, &[]).await.unwrap();

    let calls = fx.runner.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains(&"--train".to_string()));
    assert!(calls[0].contains(&"--interp".to_string()));
    assert!(calls[0].contains(&"--num-epochs".to_string()));
    assert!(calls[0].contains(&"5".to_string()));
    assert!(calls[0].contains(&"--data-dir".to_string()));

    let sent = fx.bot.sent();
    assert_eq!(sent[0], "classes: [\"cats\", \"dogs\"]");
    assert_eq!(sent[1], "[stderr]\nwarning: small dataset");
}

// --- predict ---

/// **Test: predict without attachment replies with the usage error and spawns
/// no worker.**
#[tokio::test]
async fn test_predict_without_attachment_spawns_nothing() {
    let fx = fixture();
    let msg = message("predict", vec![]);

    fx.registry.dispatch("predict", &msg, &[]).await.unwrap();

    assert!(fx.bot.sent()[0].contains("(No attachment given)"));
    assert!(fx.runner.calls().is_empty());
    assert!(!fx.root.join("predict").exists());
}

/// **Test: predict saves the upload under predict/, passes the image path,
/// correlation id and threshold to the worker, and relays stdout.**
#[tokio::test]
async fn test_predict_plumbs_worker_arguments() {
    let fx = fixture_with_runner(MockWorkerRunner::new(WorkerOutput {
        stdout: "Predicted Class: cats".to_string(),
        stderr: String::new(),
    }));

    let msg = message("predict", vec![png_attachment("who.jpg")]);
    fx.registry.dispatch("predict", &msg, &[]).await.unwrap();

    let calls = fx.runner.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];

    let img_idx = call.iter().position(|a| a == "--img-path").unwrap();
    let img_path = PathBuf::from(&call[img_idx + 1]);
    assert!(img_path.starts_with(fx.root.join("predict")));
    assert!(img_path.exists());

    let corr_idx = call.iter().position(|a| a == "--correlation-id").unwrap();
    assert_eq!(call[corr_idx + 1], "100");

    let thr_idx = call.iter().position(|a| a == "--auto-add-threshold").unwrap();
    assert_eq!(call[thr_idx + 1], "0.9");

    assert_eq!(fx.bot.sent(), vec!["Predicted Class: cats"]);
}

/// **Test: predict rejects an unsupported extension before any download or
/// spawn.**
#[tokio::test]
async fn test_predict_rejects_unsupported_extension() {
    let fx = fixture();
    let msg = message("predict", vec![png_attachment("clip.webm")]);

    fx.registry.dispatch("predict", &msg, &[]).await.unwrap();

    assert!(fx.bot.sent()[0].contains("Filetype must be one of"));
    assert!(fx.runner.calls().is_empty());
}

// --- undo of auto-adds ---

/// **Test: undo sent as a reply removes the auto-added file recorded in the
/// shared store and clears the record.**
#[tokio::test]
async fn test_undo_reply_removes_auto_added_file() {
    let fx = fixture();
    let auto_added = fx.root.join("train/cats/auto.jpg");
    std::fs::create_dir_all(auto_added.parent().unwrap()).unwrap();
    std::fs::write(&auto_added, b"x").unwrap();
    fx.store
        .record_auto_add("77", auto_added.to_str().unwrap())
        .await
        .unwrap();

    let mut msg = message("undo", vec![]);
    msg.reply_to_message_id = Some("77".to_string());
    fx.registry.dispatch("undo", &msg, &[]).await.unwrap();

    assert!(!auto_added.exists());
    assert!(!fx.store.was_auto_added("77").await.unwrap());
    assert_eq!(fx.bot.sent(), vec!["Complete!"]);
}

/// **Test: undo replying to a message with no auto-add record is a no-op
/// reply, even when a local pointer exists.**
#[tokio::test]
async fn test_undo_reply_without_record_is_noop() {
    let fx = fixture();
    fx.state.record_saved(fx.root.join("whatever.jpg")).await;

    let mut msg = message("undo", vec![]);
    msg.reply_to_message_id = Some("41".to_string());
    fx.registry.dispatch("undo", &msg, &[]).await.unwrap();

    assert_eq!(fx.bot.sent(), vec!["Nothing to undo..."]);
    assert!(fx.state.last_saved().await.is_some());
}

// --- help / artifacts ---

/// **Test: help lists every command with the prefix and substitutes config
/// tokens.**
#[tokio::test]
async fn test_help_lists_all_commands_with_prefix() {
    let fx = fixture();
    let msg = message("help", vec![]);

    fx.registry.dispatch("help", &msg, &[]).await.unwrap();

    let sent = fx.bot.sent();
    let lines: Vec<&str> = sent[0].lines().collect();
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0], "!help - You are looking at it");
    assert!(lines.iter().any(|l| l.starts_with("!add - ")));
    assert!(lines
        .iter()
        .any(|l| l.contains("You may omit !predict for this command.")));
    assert!(!sent[0].contains("{command_prefix}"));
}

/// **Test: cm replies with the fallback when no artifact exists, and sends
/// the image once it does.**
#[tokio::test]
async fn test_cm_artifact_fallback_and_send() {
    let fx = fixture();
    let msg = message("cm", vec![]);

    fx.registry.dispatch("cm", &msg, &[]).await.unwrap();
    assert_eq!(
        fx.bot.sent(),
        vec!["Confusion matrix not found! Run !train first."]
    );

    std::fs::write(fx.images.confusion_matrix_path(), b"jpg").unwrap();
    fx.registry.dispatch("cm", &msg, &[]).await.unwrap();
    let sent = fx.bot.sent();
    assert!(sent[1].starts_with("<image:"));
    assert!(sent[1].contains("confusion_matrix.jpg"));
}
