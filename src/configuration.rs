use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Root of every localdev-managed directory, relative to the home directory.
pub const LOCALDEV_DIR: &str = ".localdev";
const CONFIG_FILE: &str = "config.yaml";
const ENV_PREFIX: &str = "LOCALDEV";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub vault: VaultSettings,
    pub object_store: ObjectStoreSettings,
    pub legacy: LegacySettings,
    pub runtime: RuntimeSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaultSettings {
    pub address: String,
    pub token: String,
    pub mount: String,
    pub databag_prefix: String,
    /// Shared object store credentials, read when a databag has none.
    pub aws_secret_path: String,
    pub timeout_secs: u64,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8200".to_string(),
            token: String::new(),
            mount: "secret".to_string(),
            databag_prefix: "databags".to_string(),
            aws_secret_path: "secret/shared/services/awscfg".to_string(),
            timeout_secs: 30,
        }
    }
}

impl VaultSettings {
    /// Fill address and token from the standard Vault variables when the
    /// config sources left them at their defaults.
    fn apply_vault_env(&mut self) {
        if let Ok(address) = std::env::var("VAULT_ADDR") {
            if self.address == VaultSettings::default().address && !address.is_empty() {
                self.address = address;
            }
        }
        if self.token.is_empty() {
            if let Ok(token) = std::env::var("VAULT_TOKEN") {
                self.token = token;
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObjectStoreSettings {
    pub region: String,
    pub default_bucket: String,
    /// S3-compatible endpoint (MinIO etc.); AWS when unset.
    pub endpoint: Option<String>,
}

impl Default for ObjectStoreSettings {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            default_bucket: "nmdarchive".to_string(),
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LegacySettings {
    /// Directory holding `.localdev/`; the user's home when unset.
    pub home: Option<PathBuf>,
    pub image_prefix: String,
    /// Custom docker-compose template file; the built-in one when unset.
    pub compose_template: Option<PathBuf>,
}

impl Default for LegacySettings {
    fn default() -> Self {
        Self {
            home: None,
            image_prefix: "drud/nginx-php-fpm".to_string(),
            compose_template: None,
        }
    }
}

impl LegacySettings {
    pub fn home_dir(&self) -> PathBuf {
        self.home.clone().unwrap_or_else(default_home)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub command_timeout_secs: u64,
    pub readiness_retries: u32,
    pub readiness_interval_ms: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            command_timeout_secs: 600,
            readiness_retries: 300,
            readiness_interval_ms: 500,
        }
    }
}

fn default_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// `~/.localdev/config.yaml`
pub fn default_config_path() -> PathBuf {
    default_home().join(LOCALDEV_DIR).join(CONFIG_FILE)
}

pub fn get_configuration(path: Option<&Path>) -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let mut builder = config::Config::builder();

    builder = match path {
        // An explicitly requested file must exist.
        Some(path) => builder.add_source(config::File::from(path)),
        None => builder.add_source(config::File::from(default_config_path()).required(false)),
    };

    let mut settings: Settings = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()?;

    settings.vault.apply_vault_env();

    Ok(settings)
}
