//! Shared test doubles for the host-command layer.

use std::sync::Mutex;

use crate::cli::error::LegacyError;
use crate::cli::executor::{CommandExecutor, CommandOutput};

type Responder = Box<dyn Fn(&str, &[String]) -> CommandOutput + Send + Sync>;

/// Records every command and answers with a caller-supplied responder.
pub(crate) struct MockExecutor {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    responder: Responder,
}

impl MockExecutor {
    /// Every command succeeds with empty output.
    pub(crate) fn ok() -> Self {
        Self::with(|_, _| ok_output(""))
    }

    pub(crate) fn with<F>(responder: F) -> Self
    where
        F: Fn(&str, &[String]) -> CommandOutput + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    pub(crate) fn recorded_calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls rendered as `program arg1 arg2 ...`.
    pub(crate) fn command_lines(&self) -> Vec<String> {
        self.recorded_calls()
            .into_iter()
            .map(|(program, args)| {
                if args.is_empty() {
                    program
                } else {
                    format!("{} {}", program, args.join(" "))
                }
            })
            .collect()
    }
}

impl CommandExecutor for MockExecutor {
    fn execute(&self, program: &str, args: &[&str]) -> Result<CommandOutput, LegacyError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.clone()));
        Ok((self.responder)(program, &args))
    }
}

pub(crate) fn ok_output(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub(crate) fn failed_output(stderr: &str) -> CommandOutput {
    CommandOutput {
        exit_code: 1,
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}
