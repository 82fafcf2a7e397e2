use reqwest::Method;

use super::LegacyApp;
use crate::cli::error::LegacyError;

impl LegacyApp {
    /// Pull images then bring the stack up detached.
    #[tracing::instrument(name = "Start containers", skip(self), fields(name = %self.name, environment = %self.environment))]
    pub fn start(&mut self) -> Result<(), LegacyError> {
        self.deps.cancellation.check()?;
        let compose = self.compose_path();

        self.deps.runtime.compose(&compose, &["pull"])?;
        self.deps.cancellation.check()?;
        self.deps.runtime.compose(&compose, &["up", "-d"])?;

        // Published ports change on every start.
        self.web_port = None;
        self.db_port = None;

        tracing::info!("Started {}", self.container_name());
        Ok(())
    }

    /// Stop the stack, keeping containers and volumes.
    #[tracing::instrument(name = "Stop containers", skip(self), fields(name = %self.name, environment = %self.environment))]
    pub fn stop(&mut self) -> Result<(), LegacyError> {
        self.deps.cancellation.check()?;
        self.deps.runtime.compose(&self.compose_path(), &["stop"])?;
        self.web_port = None;
        self.db_port = None;
        tracing::info!("Stopped {}", self.container_name());
        Ok(())
    }

    /// `compose down`, falling back to [`cleanup`](Self::cleanup) when the
    /// compose file is gone or the command fails.
    #[tracing::instrument(name = "Tear down containers", skip(self), fields(name = %self.name, environment = %self.environment))]
    pub fn teardown_and_cleanup(&mut self) -> Result<(), LegacyError> {
        self.deps.cancellation.check()?;
        self.web_port = None;
        self.db_port = None;

        if !self.compose_file_exists() {
            tracing::warn!(
                "{} is missing, removing containers directly",
                self.compose_path().display()
            );
            return self.cleanup();
        }

        match self.deps.runtime.compose(&self.compose_path(), &["down"]) {
            Ok(_) => {
                tracing::info!("Removed {}", self.container_name());
                Ok(())
            }
            Err(LegacyError::Cancelled) => Err(LegacyError::Cancelled),
            Err(e) => {
                tracing::warn!("compose down failed ({}), removing containers directly", e);
                self.cleanup()
            }
        }
    }

    /// Stop and remove every running container whose name contains
    /// `legacy-<name>-<environment>`. No match is not an error.
    pub fn cleanup(&self) -> Result<(), LegacyError> {
        let needle = self.container_name();
        let matched: Vec<_> = self
            .deps
            .runtime
            .list_containers()?
            .into_iter()
            .filter(|c| c.name.contains(&needle))
            .collect();

        if matched.is_empty() {
            tracing::info!("No containers matching {}", needle);
            return Ok(());
        }

        for container in &matched {
            self.deps.cancellation.check()?;
            tracing::info!("Removing container {}", container.name);
            self.deps.runtime.remove_container(container)?;
        }

        Ok(())
    }

    /// Poll the web container until it answers 200; returns its URL.
    #[tracing::instrument(name = "Wait for site", skip(self), fields(name = %self.name, environment = %self.environment))]
    pub fn wait_until_ready(&mut self) -> Result<String, LegacyError> {
        let port = match self.web_port {
            Some(port) => port,
            None => {
                let port = self.deps.runtime.published_port(&self.web_container())?;
                self.web_port = Some(port);
                port
            }
        };

        let url = format!("http://localhost:{port}");
        self.deps
            .probe
            .ensure_status(&url, Method::GET, None, self.deps.readiness_retries, 200)?;

        tracing::info!("{} is ready at {}", self.container_name(), url);
        Ok(url)
    }
}
