use std::path::PathBuf;

use thiserror::Error;

use crate::models::AppType;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LegacyError — unified error hierarchy for every lifecycle stage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Error)]
pub enum LegacyError {
    // Config store errors
    #[error("No databag found for {name}{}", environment_suffix(.environment))]
    ConfigNotFound {
        name: String,
        environment: Option<String>,
    },
    #[error("Databag for {name} has a malformed environment '{environment}': {reason}")]
    MalformedDatabag {
        name: String,
        environment: String,
        reason: String,
    },
    #[error("Object store credentials unavailable: {0}")]
    CredentialsUnavailable(String),
    #[error("Remote store unavailable: {0}")]
    StoreUnavailable(String),

    // Archive errors
    #[error("No archive found in bucket '{bucket}' under prefix '{prefix}'")]
    NoArchiveAvailable { bucket: String, prefix: String },
    #[error("Failed to download '{key}': {reason}")]
    DownloadFailed { key: String, reason: String },
    #[error("Failed to extract {}: {output}", .archive.display())]
    ExtractionFailed { archive: PathBuf, output: String },
    #[error("Failed to sync docroot: {output}")]
    SyncFailed { output: String },

    // Detection and config errors
    #[error("App type detection failed in {}: {reason}", .path.display())]
    DetectionFailed { path: PathBuf, reason: String },
    #[error("Unsupported app type '{app_type}'")]
    UnsupportedAppType { app_type: AppType },
    #[error("Could not resolve published port for container '{container}': {reason}")]
    PortResolution { container: String, reason: String },
    #[error("Failed to render {}: {reason}", .path.display())]
    ConfigRender { path: PathBuf, reason: String },

    // Container errors
    #[error("docker compose {action} failed: {output}")]
    ComposeCommandFailed { action: String, output: String },
    #[error("Could not {action} container {container}: {output}")]
    ContainerCleanupFailed {
        action: String,
        container: String,
        output: String,
    },
    #[error("{url} did not return HTTP 200 after {attempts} attempts")]
    NotReady { url: String, attempts: u32 },

    // Runtime errors
    #[error("Command '{command}' could not be run: {reason}")]
    CommandFailed { command: String, reason: String },
    #[error("Command '{command}' timed out after {timeout_secs}s")]
    CommandTimedOut { command: String, timeout_secs: u64 },
    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn environment_suffix(environment: &Option<String>) -> String {
    environment
        .as_deref()
        .map(|e| format!(" (environment '{e}')"))
        .unwrap_or_default()
}

impl LegacyError {
    /// True when the caller's cancellation signal aborted the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
