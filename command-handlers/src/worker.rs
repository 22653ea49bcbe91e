//! Worker-spawning seam: the training/inference worker runs as a separate OS
//! process whose combined stdout/stderr is relayed back to the chat.
//! [`WorkerRunner`] is a trait so tests can substitute a mock.

use async_trait::async_trait;
use classibot_core::{Bot, BotError, Chat, Result};
use tracing::{info, warn};

/// Captured output of a finished worker process.
#[derive(Debug, Clone, Default)]
pub struct WorkerOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Spawns the worker and waits for it to exit.
#[async_trait]
pub trait WorkerRunner: Send + Sync {
    async fn run(&self, args: &[String]) -> Result<WorkerOutput>;
}

/// Runs the configured worker program as a child process.
pub struct ProcessWorkerRunner {
    program: String,
}

impl ProcessWorkerRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl WorkerRunner for ProcessWorkerRunner {
    async fn run(&self, args: &[String]) -> Result<WorkerOutput> {
        info!(program = %self.program, args = ?args, "Spawning worker");
        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|e| BotError::Worker(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            warn!(code = ?output.status.code(), "Worker exited non-zero");
        }

        Ok(WorkerOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs a one-off shell line (host introspection for `debug`).
pub async fn shell_output(cmd: &str) -> Result<WorkerOutput> {
    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .output()
        .await
        .map_err(|e| BotError::Worker(format!("sh -c {:?}: {}", cmd, e)))?;

    Ok(WorkerOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Relays worker output to the chat: stdout as-is, stderr prefixed so users
/// can tell framework noise from results.
pub async fn relay_output(bot: &dyn Bot, chat: &Chat, output: &WorkerOutput) -> Result<()> {
    if !output.stdout.trim().is_empty() {
        bot.send_message(chat, output.stdout.trim_end()).await?;
    }
    if !output.stderr.trim().is_empty() {
        bot.send_message(chat, &format!("[stderr]\n{}", output.stderr.trim_end()))
            .await?;
    }
    Ok(())
}
