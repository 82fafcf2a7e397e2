use std::path::Path;
use std::sync::Arc;

use crate::cli::error::LegacyError;
use crate::cli::executor::{CommandExecutor, CommandOutput};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ContainerInfo — minimal container metadata
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Lightweight representation of a running Docker container.
/// Populated by `ContainerRuntime::list_containers()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub image: String,
    pub ports: Vec<u16>,
    pub status: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ContainerRuntime trait — abstraction over Docker CLI (DIP)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Abstraction for interacting with the local container runtime.
///
/// Production: `DockerCliRuntime` shells out to `docker` / `docker compose`
/// through a `CommandExecutor`.
pub trait ContainerRuntime: Send + Sync {
    /// `docker compose -f <compose_path> <args...>`; a non-zero exit is
    /// `ComposeCommandFailed`.
    fn compose(&self, compose_path: &Path, args: &[&str]) -> Result<CommandOutput, LegacyError>;
    fn list_containers(&self) -> Result<Vec<ContainerInfo>, LegacyError>;
    /// First host port published by the running container named exactly `container`.
    fn published_port(&self, container: &str) -> Result<u16, LegacyError>;
    /// Force stop then remove a single container.
    fn remove_container(&self, container: &ContainerInfo) -> Result<(), LegacyError>;
    /// Run an arbitrary host binary (tar, rsync) and return its raw output.
    fn run_host_command(&self, program: &str, args: &[&str]) -> Result<CommandOutput, LegacyError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DockerCliRuntime — production implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct DockerCliRuntime {
    executor: Arc<dyn CommandExecutor>,
}

impl DockerCliRuntime {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }
}

/// Format string handed to `docker ps`.
const PS_FORMAT: &str = "{{.ID}}|{{.Names}}|{{.Image}}|{{.Ports}}|{{.Status}}";

/// Build `docker compose -f <path> <args...>` arguments.
pub fn build_compose_args(compose_path: &str, args: &[&str]) -> Vec<String> {
    let mut all = vec![
        "compose".to_string(),
        "-f".to_string(),
        compose_path.to_string(),
    ];
    all.extend(args.iter().map(|a| a.to_string()));
    all
}

impl ContainerRuntime for DockerCliRuntime {
    fn compose(&self, compose_path: &Path, args: &[&str]) -> Result<CommandOutput, LegacyError> {
        let compose_str = compose_path.to_string_lossy().to_string();
        let all = build_compose_args(&compose_str, args);
        let args_refs: Vec<&str> = all.iter().map(|s| s.as_str()).collect();

        let output = self.executor.execute("docker", &args_refs)?;
        if !output.success() {
            return Err(LegacyError::ComposeCommandFailed {
                action: args.join(" "),
                output: output.combined(),
            });
        }

        Ok(output)
    }

    fn list_containers(&self) -> Result<Vec<ContainerInfo>, LegacyError> {
        let output = self
            .executor
            .execute("docker", &["ps", "--format", PS_FORMAT])?;

        if !output.success() {
            return Err(LegacyError::CommandFailed {
                command: "docker ps".to_string(),
                reason: output.combined(),
            });
        }

        let containers = output
            .stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(parse_docker_ps_line)
            .collect();

        Ok(containers)
    }

    fn published_port(&self, container: &str) -> Result<u16, LegacyError> {
        let containers = self.list_containers()?;

        let found = containers
            .iter()
            .find(|c| c.name == container)
            .ok_or_else(|| LegacyError::PortResolution {
                container: container.to_string(),
                reason: "container is not running".to_string(),
            })?;

        found
            .ports
            .first()
            .copied()
            .ok_or_else(|| LegacyError::PortResolution {
                container: container.to_string(),
                reason: "container publishes no ports".to_string(),
            })
    }

    fn remove_container(&self, container: &ContainerInfo) -> Result<(), LegacyError> {
        for action in ["stop", "rm"] {
            let output = self.executor.execute("docker", &[action, container.id.as_str()])?;
            if !output.success() {
                return Err(LegacyError::ContainerCleanupFailed {
                    action: action.to_string(),
                    container: container.name.clone(),
                    output: output.combined(),
                });
            }
        }

        Ok(())
    }

    fn run_host_command(&self, program: &str, args: &[&str]) -> Result<CommandOutput, LegacyError> {
        self.executor.execute(program, args)
    }
}

/// Parse a single line from `docker ps --format "{{.ID}}|{{.Names}}|{{.Image}}|{{.Ports}}|{{.Status}}"`.
fn parse_docker_ps_line(line: &str) -> ContainerInfo {
    let parts: Vec<&str> = line.splitn(5, '|').collect();

    let id = parts.first().unwrap_or(&"").to_string();
    let name = parts.get(1).unwrap_or(&"").to_string();
    let image = parts.get(2).unwrap_or(&"").to_string();
    let ports_str = parts.get(3).unwrap_or(&"");
    let status = parts.get(4).unwrap_or(&"").to_string();

    let ports = extract_host_ports(ports_str);

    ContainerInfo {
        id,
        name,
        image,
        ports,
        status,
    }
}

/// Extract host-side port numbers from Docker port mapping strings like
/// `0.0.0.0:32768->80/tcp, :::32768->80/tcp`.
fn extract_host_ports(ports_str: &str) -> Vec<u16> {
    let mut ports = Vec::new();
    for part in ports_str.split(',') {
        let part = part.trim();
        // Format: "0.0.0.0:HOST_PORT->CONTAINER_PORT/proto" or "HOST_PORT->CONTAINER_PORT/proto"
        if let Some(arrow_idx) = part.find("->") {
            let before_arrow = &part[..arrow_idx];
            if let Some(port_str) = before_arrow.rsplit(':').next() {
                if let Ok(port) = port_str.parse::<u16>() {
                    if !ports.contains(&port) {
                        ports.push(port);
                    }
                }
            }
        }
    }
    ports
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
