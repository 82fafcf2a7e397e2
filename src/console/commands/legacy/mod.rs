//! `localdev legacy <command> <name> <environment>`

pub mod add;
pub mod config;
pub mod path;
pub mod ready;
pub mod rm;
pub mod start;
pub mod stop;

use std::path::PathBuf;

use anyhow::Context;

use crate::cli::cancel::Cancellation;
use crate::cli::error::LegacyError;
use crate::cli::progress::{self, Stage};
use crate::configuration::get_configuration;
use crate::legacy::{Collaborators, LegacyApp};

/// The app a command operates on, plus where its settings come from.
#[derive(Debug, Clone)]
pub struct LegacyTarget {
    pub name: String,
    pub environment: String,
    /// Explicit config file; `~/.localdev/config.yaml` when unset.
    pub config_path: Option<PathBuf>,
    pub cancellation: Cancellation,
}

impl LegacyTarget {
    pub fn new(
        name: String,
        environment: String,
        config_path: Option<PathBuf>,
        cancellation: Cancellation,
    ) -> Self {
        Self {
            name,
            environment,
            config_path,
            cancellation,
        }
    }

    /// `<name>-<environment>`, used in progress output.
    pub fn label(&self) -> String {
        format!("{}-{}", self.name, self.environment)
    }

    pub fn open(&self) -> anyhow::Result<LegacyApp> {
        let settings = get_configuration(self.config_path.as_deref())
            .context("Failed to load localdev configuration")?;
        let deps = Collaborators::production(&settings, self.cancellation.clone())
            .context("Failed to set up Vault, S3 and docker clients")?;

        LegacyApp::new(&self.name, &self.environment, &settings.legacy, deps)
            .with_context(|| format!("Failed to open legacy app {}", self.label()))
    }
}

/// Run one stage behind a spinner.
pub(crate) fn with_spinner<T>(
    label: &str,
    stage: Stage,
    run: impl FnOnce() -> Result<T, LegacyError>,
) -> Result<T, LegacyError> {
    let pb = progress::stage_spinner(label, stage);
    match run() {
        Ok(value) => {
            progress::finish_success(&pb, &format!("{}: {}", label, stage.describe()));
            Ok(value)
        }
        Err(e) => {
            progress::finish_error(&pb, &format!("{}: {}", label, e));
            Err(e)
        }
    }
}
