//! Lifecycle of a legacy Drupal or WordPress app.
//!
//! A [`LegacyApp`] is bound to one `(name, environment)` pair and moves
//! through: resolve → fetch → unpack → detect → compose → start →
//! configure → wait. Each stage is a method taking `&mut self`; stage
//! ordering is the caller's contract, [`LegacyApp::add`] runs them all.

mod config;
mod containers;
mod resources;


use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::cancel::Cancellation;
use crate::cli::container_runtime::{ContainerRuntime, DockerCliRuntime};
use crate::cli::detector::{detect_app_type, FileSystem, RealFileSystem};
use crate::cli::error::LegacyError;
use crate::cli::executor::ShellExecutor;
use crate::cli::progress::Stage;
use crate::configuration::{LegacySettings, Settings, LOCALDEV_DIR};
use crate::helpers::{HttpProbe, ObjectStoreFactory, ReqwestProbe, S3Factory, VaultClient};
use crate::models::{AppType, ConfigStore, RepoDetails, SecretStore};
use crate::services::{ConfigRenderer, DEFAULT_COMPOSE_TEMPLATE};

const LEGACY_DIR: &str = "legacy";
const COMPOSE_FILE: &str = "docker-compose.yaml";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Collaborators — everything a lifecycle run talks to
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone)]
pub struct Collaborators {
    pub config_store: Arc<dyn ConfigStore>,
    pub secret_store: Arc<dyn SecretStore>,
    pub object_stores: Arc<dyn ObjectStoreFactory>,
    pub runtime: Arc<dyn ContainerRuntime>,
    pub probe: Arc<dyn HttpProbe>,
    pub renderer: Arc<ConfigRenderer>,
    pub filesystem: Arc<dyn FileSystem>,
    pub cancellation: Cancellation,
    /// Bucket used when a databag names none.
    pub default_bucket: String,
    /// Secret holding shared `accesskey` / `secretkey`.
    pub aws_secret_path: String,
    pub readiness_retries: u32,
}

impl Collaborators {
    /// Vault, S3, docker and reqwest backed collaborators.
    pub fn production(settings: &Settings, cancellation: Cancellation) -> Result<Self, LegacyError> {
        let command_timeout = Duration::from_secs(settings.runtime.command_timeout_secs);

        let executor = Arc::new(ShellExecutor::new(command_timeout, cancellation.clone()));
        let vault = Arc::new(VaultClient::new(&settings.vault)?);
        let probe = ReqwestProbe::new(
            Duration::from_millis(settings.runtime.readiness_interval_ms),
            cancellation.clone(),
        )?;

        Ok(Self {
            config_store: vault.clone(),
            secret_store: vault,
            object_stores: Arc::new(S3Factory::new(
                &settings.object_store,
                command_timeout,
                cancellation.clone(),
            )),
            runtime: Arc::new(DockerCliRuntime::new(executor)),
            probe: Arc::new(probe),
            renderer: Arc::new(ConfigRenderer::new()?),
            filesystem: Arc::new(RealFileSystem),
            cancellation,
            default_bucket: settings.object_store.default_bucket.clone(),
            aws_secret_path: settings.vault.aws_secret_path.clone(),
            readiness_retries: settings.runtime.readiness_retries,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LegacyApp
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct LegacyApp {
    pub name: String,
    pub environment: String,
    /// Resolved lazily by `set_type` when unset.
    pub app_type: Option<AppType>,
    pub compose_template: String,
    /// Host ports; only known once the containers run.
    pub web_port: Option<u16>,
    pub db_port: Option<u16>,
    /// Set by `fetch_resources`, cleared by a successful `unpack_resources`.
    pub archive_path: Option<PathBuf>,
    pub home: PathBuf,
    pub image_prefix: String,
    deps: Collaborators,
}

impl LegacyApp {
    pub fn new(
        name: &str,
        environment: &str,
        settings: &LegacySettings,
        deps: Collaborators,
    ) -> Result<Self, LegacyError> {
        let compose_template = match &settings.compose_template {
            Some(path) => std::fs::read_to_string(path).map_err(|e| LegacyError::ConfigRender {
                path: path.clone(),
                reason: format!("cannot read compose template: {e}"),
            })?,
            None => DEFAULT_COMPOSE_TEMPLATE.to_string(),
        };

        Ok(Self {
            name: name.to_string(),
            environment: environment.to_string(),
            app_type: None,
            compose_template,
            web_port: None,
            db_port: None,
            archive_path: None,
            home: settings.home_dir(),
            image_prefix: settings.image_prefix.clone(),
            deps,
        })
    }

    // ── Layout ───────────────────────────────────────

    /// `legacy/<name>-<environment>`, relative to `~/.localdev`.
    pub fn rel_path(&self) -> PathBuf {
        PathBuf::from(LEGACY_DIR).join(format!("{}-{}", self.name, self.environment))
    }

    /// Working directory: `<home>/.localdev/legacy/<name>-<environment>`.
    pub fn resolve_paths(&self) -> PathBuf {
        self.home.join(LOCALDEV_DIR).join(self.rel_path())
    }

    pub fn compose_path(&self) -> PathBuf {
        self.resolve_paths().join(COMPOSE_FILE)
    }

    /// Extraction target for the archive.
    pub fn files_dir(&self) -> PathBuf {
        self.resolve_paths().join("files")
    }

    /// Holds the database dump picked up by the db container.
    pub fn data_dir(&self) -> PathBuf {
        self.resolve_paths().join("data")
    }

    pub fn src_dir(&self) -> PathBuf {
        self.resolve_paths().join("src")
    }

    pub fn docroot(&self) -> PathBuf {
        self.src_dir().join("docroot")
    }

    /// `legacy-<name>-<environment>`; containers are suffixed `-web` / `-db`.
    pub fn container_name(&self) -> String {
        format!("legacy-{}-{}", self.name, self.environment)
    }

    pub fn web_container(&self) -> String {
        format!("{}-web", self.container_name())
    }

    pub fn db_container(&self) -> String {
        format!("{}-db", self.container_name())
    }

    pub fn prepare_workspace(&self) -> Result<(), LegacyError> {
        for dir in [self.files_dir(), self.data_dir(), self.docroot()] {
            std::fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    // ── Compose file ─────────────────────────────────

    pub fn render_compose(&self) -> Result<String, LegacyError> {
        let app_type = self.app_type.unwrap_or(AppType::Unknown);
        let tag = app_type
            .image_tag()
            .ok_or(LegacyError::UnsupportedAppType { app_type })?;
        let image = format!("{}-{}", self.image_prefix, tag);

        self.deps.renderer.render_compose(
            &self.compose_template,
            &image,
            &self.container_name(),
            &self.compose_path(),
        )
    }

    pub fn write_compose(&self) -> Result<PathBuf, LegacyError> {
        let content = self.render_compose()?;
        let path = self.compose_path();
        self.deps.renderer.write(&path, &content)?;
        tracing::info!("Wrote {}", path.display());
        Ok(path)
    }

    pub fn compose_file_exists(&self) -> bool {
        self.deps.filesystem.exists(&self.compose_path())
    }

    // ── Databag ──────────────────────────────────────

    /// `Ok(false)` when the store has no databag for this app.
    pub fn databag_exists(&self) -> Result<bool, LegacyError> {
        match self.deps.config_store.record(&self.name) {
            Ok(_) => Ok(true),
            Err(LegacyError::ConfigNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn repo_details(&self) -> Result<RepoDetails, LegacyError> {
        let record = self.deps.config_store.record(&self.name)?;
        Ok(record.environment(&self.environment)?.repo_details())
    }

    // ── Type detection ───────────────────────────────

    pub fn detect_type(&self) -> Result<AppType, LegacyError> {
        detect_app_type(&self.docroot(), self.deps.filesystem.as_ref())
    }

    pub fn set_type(&mut self) -> Result<AppType, LegacyError> {
        let app_type = self.detect_type()?;
        tracing::info!("Detected {} as {}", self.name, app_type);
        self.app_type = Some(app_type);
        Ok(app_type)
    }

    // ── Pipeline ─────────────────────────────────────

    /// Full provisioning run. Returns the site URL once it answers 200.
    ///
    /// Containers start before the settings files are rendered because the
    /// files carry the published ports.
    pub fn add<F: FnMut(Stage)>(&mut self, mut on_stage: F) -> Result<String, LegacyError> {
        self.prepare_workspace()?;

        self.enter(Stage::Fetch, &mut on_stage)?;
        self.fetch_resources()?;

        self.enter(Stage::Unpack, &mut on_stage)?;
        self.unpack_resources()?;
        if self.app_type.is_none() {
            self.set_type()?;
        }

        self.enter(Stage::Compose, &mut on_stage)?;
        self.write_compose()?;

        self.enter(Stage::Start, &mut on_stage)?;
        self.start()?;

        self.enter(Stage::Configure, &mut on_stage)?;
        self.generate_config()?;

        self.enter(Stage::Wait, &mut on_stage)?;
        self.wait_until_ready()
    }

    fn enter<F: FnMut(Stage)>(&self, stage: Stage, on_stage: &mut F) -> Result<(), LegacyError> {
        self.deps.cancellation.check()?;
        tracing::debug!("{}: {}", self.container_name(), stage.describe());
        on_stage(stage);
        Ok(())
    }
}
