use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{Map, Value};

use crate::cli::error::LegacyError;
use crate::configuration::VaultSettings;
use crate::models::{AppRecord, ConfigStore, SecretStore};

/// Blocking client for the Vault KV HTTP API.
///
/// Serves both databag lookups (`ConfigStore`) and shared secret reads
/// (`SecretStore`).
#[derive(Debug)]
pub struct VaultClient {
    client: Client,
    address: String,
    token: String,
    mount: String,
    databag_prefix: String,
}

impl VaultClient {
    pub fn new(settings: &VaultSettings) -> Result<Self, LegacyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LegacyError::StoreUnavailable(format!("HTTP client error: {e}")))?;

        Ok(Self {
            client,
            address: settings.address.clone(),
            token: settings.token.clone(),
            mount: settings.mount.clone(),
            databag_prefix: settings.databag_prefix.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/v1/{}",
            self.address.trim_end_matches('/'),
            path.trim_matches('/')
        )
    }

    /// Logical path of an app's databag.
    pub fn databag_path(&self, name: &str) -> String {
        let mount = self.mount.trim_matches('/');
        let prefix = self.databag_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{}/{}", mount, name)
        } else {
            format!("{}/{}/{}", mount, prefix, name)
        }
    }

    /// GET a logical path. `Ok(None)` when Vault answers 404.
    #[tracing::instrument(name = "Read path from Vault", skip(self))]
    fn read(&self, path: &str) -> Result<Option<Map<String, Value>>, LegacyError> {
        let resp = self
            .client
            .get(self.url(path))
            .header("X-Vault-Token", &self.token)
            .send()
            .map_err(|e| {
                tracing::error!("Failed to reach Vault: {:?}", e);
                LegacyError::StoreUnavailable(format!("Vault request error: {e}"))
            })?;

        if resp.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Vault path {} not found", path);
            return Ok(None);
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body: String = resp.text().unwrap_or_default().chars().take(240).collect();
            tracing::error!("Vault returned {} for {}", status, path);
            return Err(LegacyError::StoreUnavailable(format!(
                "Vault returned HTTP {status} for {path}: {body}"
            )));
        }

        let body: Value = resp.json().map_err(|e| {
            LegacyError::StoreUnavailable(format!("Invalid Vault response for {path}: {e}"))
        })?;

        unwrap_envelope(body)
            .map(Some)
            .ok_or_else(|| {
                LegacyError::StoreUnavailable(format!("Vault response for {path} has no data"))
            })
    }
}

/// Accepts both KV v2 (`data.data`) and KV v1 (`data`) envelopes.
fn unwrap_envelope(body: Value) -> Option<Map<String, Value>> {
    let data = match body {
        Value::Object(mut root) => root.remove("data")?,
        _ => return None,
    };

    match data {
        Value::Object(mut inner) => {
            if matches!(inner.get("data"), Some(Value::Object(_))) && inner.contains_key("metadata")
            {
                match inner.remove("data") {
                    Some(Value::Object(kv2)) => Some(kv2),
                    _ => None,
                }
            } else {
                Some(inner)
            }
        }
        _ => None,
    }
}

impl ConfigStore for VaultClient {
    fn record(&self, name: &str) -> Result<AppRecord, LegacyError> {
        let path = self.databag_path(name);
        let document = self
            .read(&path)?
            .ok_or_else(|| LegacyError::ConfigNotFound {
                name: name.to_string(),
                environment: None,
            })?;

        tracing::info!("Fetched databag for {}", name);
        Ok(AppRecord::from_document(name, document))
    }
}

impl SecretStore for VaultClient {
    fn read_secret(&self, path: &str) -> Result<Map<String, Value>, LegacyError> {
        self.read(path)?.ok_or_else(|| {
            LegacyError::CredentialsUnavailable(format!("no secret stored at {path}"))
        })
    }
}
