use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::cli::cancel::Cancellation;
use crate::cli::error::LegacyError;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default upper bound for a single host command (pulls and large
/// archive extractions included).
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CommandExecutor — abstraction for running shell commands (DIP)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Result of executing a command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout and stderr joined, for error reports.
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, true) => format!("exit code {}", self.exit_code),
            (false, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
}

/// Abstraction over shell command execution.
///
/// Production: `ShellExecutor` runs commands via `std::process::Command`.
/// Tests: mock executors record commands for assertion without side effects.
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput, LegacyError>;
}

/// Production executor with a per-command deadline and cancellation.
pub struct ShellExecutor {
    timeout: Duration,
    cancellation: Cancellation,
}

impl ShellExecutor {
    pub fn new(timeout: Duration, cancellation: Cancellation) -> Self {
        Self {
            timeout,
            cancellation,
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT, Cancellation::new())
    }
}

impl CommandExecutor for ShellExecutor {
    fn execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput, LegacyError> {
        self.cancellation.check()?;

        let command_line = format!("{} {}", program, args.join(" "));
        tracing::debug!(command = %command_line, "Running host command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LegacyError::CommandFailed {
                command: command_line.clone(),
                reason: e.to_string(),
            })?;

        // Pipes are drained off-thread; a full pipe would stall the child.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if self.cancellation.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                return Err(LegacyError::Cancelled);
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(LegacyError::CommandTimedOut {
                    command: command_line,
                    timeout_secs: self.timeout.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        Ok(CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout: collect(stdout),
            stderr: collect(stderr),
        })
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).to_string()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
