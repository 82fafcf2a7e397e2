//! Per-app metadata ("databags") resolved from the remote config store.
//!
//! A databag is one JSON document per app. Every object-valued top-level
//! key is an environment name mapping to an [`EnvironmentRecord`]; scalar
//! keys such as `id` are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::cli::error::LegacyError;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EnvironmentRecord — secrets and coordinates for one environment
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentRecord {
    #[serde(deserialize_with = "null_as_empty")]
    pub aws_bucket: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub aws_access_key: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub aws_secret_key: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub hash_salt: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub auth_key: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub auth_salt: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub logged_in_key: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub logged_in_salt: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub nonce_key: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub nonce_salt: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub secure_auth_key: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub secure_auth_salt: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub git_url: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub git_branch: String,
}

/// Databags edited by hand carry `null` for unset values.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Source repository coordinates of an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoDetails {
    pub url: String,
    pub branch: String,
}

impl EnvironmentRecord {
    pub fn repo_details(&self) -> RepoDetails {
        let branch = if self.git_branch.is_empty() {
            "master".to_string()
        } else {
            self.git_branch.clone()
        };

        RepoDetails {
            url: self.git_url.clone(),
            branch,
        }
    }

    /// Access/secret key pair, if the record carries a complete one.
    pub fn aws_credentials(&self) -> Option<(&str, &str)> {
        if self.aws_access_key.is_empty() || self.aws_secret_key.is_empty() {
            None
        } else {
            Some((&self.aws_access_key, &self.aws_secret_key))
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AppRecord — the whole databag for one app
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Environments are kept raw and parsed on lookup, so one malformed
/// environment does not hide its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppRecord {
    pub name: String,
    pub environments: BTreeMap<String, Value>,
}

impl AppRecord {
    pub fn from_document(name: &str, document: Map<String, Value>) -> Self {
        let environments = document
            .into_iter()
            .filter(|(_, value)| value.is_object())
            .collect();

        Self {
            name: name.to_string(),
            environments,
        }
    }

    pub fn insert_environment(&mut self, environment: &str, record: &EnvironmentRecord) {
        let value = serde_json::to_value(record).unwrap_or(Value::Null);
        self.environments.insert(environment.to_string(), value);
    }

    pub fn environment(&self, environment: &str) -> Result<EnvironmentRecord, LegacyError> {
        let value = self
            .environments
            .get(environment)
            .ok_or_else(|| LegacyError::ConfigNotFound {
                name: self.name.clone(),
                environment: Some(environment.to_string()),
            })?;

        EnvironmentRecord::deserialize(value).map_err(|e| LegacyError::MalformedDatabag {
            name: self.name.clone(),
            environment: environment.to_string(),
            reason: e.to_string(),
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Store traits — abstraction for testability (DIP)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Resolves databags by app name.
///
/// Production: `VaultClient` reads `<mount>/<databag_prefix>/<name>`.
/// Tests: in-memory maps.
pub trait ConfigStore: Send + Sync {
    fn record(&self, name: &str) -> Result<AppRecord, LegacyError>;
}

/// Reads shared secrets, used when a databag carries no object store keys.
pub trait SecretStore: Send + Sync {
    fn read_secret(&self, path: &str) -> Result<Map<String, Value>, LegacyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_document_skips_scalar_keys() {
        let record = AppRecord::from_document(
            "foo",
            document(json!({
                "id": "foo",
                "production": { "aws_bucket": "archive", "hash_salt": "abc" },
                "staging": {}
            })),
        );

        assert_eq!(record.environments.len(), 2);
        let prod = record.environment("production").unwrap();
        assert_eq!(prod.aws_bucket, "archive");
        assert_eq!(prod.hash_salt, "abc");
        assert_eq!(prod.auth_key, "");
    }

    #[test]
    fn test_missing_environment_is_config_not_found() {
        let record = AppRecord::from_document("foo", document(json!({ "prod": {} })));
        let err = record.environment("stage").unwrap_err();
        assert!(matches!(
            err,
            LegacyError::ConfigNotFound { ref environment, .. } if environment.as_deref() == Some("stage")
        ));
    }

    #[test]
    fn test_malformed_environment_is_rejected() {
        let record =
            AppRecord::from_document("foo", document(json!({ "prod": { "hash_salt": 42 } })));
        let err = record.environment("prod").unwrap_err();
        assert!(matches!(
            err,
            LegacyError::MalformedDatabag { ref environment, .. } if environment == "prod"
        ));
        assert!(err.to_string().contains("Databag for foo"));
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let record = AppRecord::from_document(
            "foo",
            document(json!({ "prod": { "aws_bucket": null, "hash_salt": "abc" } })),
        );
        let prod = record.environment("prod").unwrap();
        assert_eq!(prod.aws_bucket, "");
        assert_eq!(prod.hash_salt, "abc");
    }

    #[test]
    fn test_malformed_sibling_does_not_hide_environment() {
        let record = AppRecord::from_document(
            "foo",
            document(json!({
                "prod": { "aws_bucket": "archive" },
                "stage": { "aws_bucket": null, "hash_salt": ["not", "a", "string"] }
            })),
        );

        assert_eq!(record.environment("prod").unwrap().aws_bucket, "archive");
        assert!(matches!(
            record.environment("stage"),
            Err(LegacyError::MalformedDatabag { .. })
        ));
    }

    #[test]
    fn test_insert_environment_round_trips_record() {
        let mut record = AppRecord {
            name: "foo".to_string(),
            ..Default::default()
        };
        let env = EnvironmentRecord {
            hash_salt: "salty".to_string(),
            ..Default::default()
        };
        record.insert_environment("prod", &env);
        assert_eq!(record.environment("prod").unwrap(), env);
    }

    #[test]
    fn test_aws_credentials_require_both_keys() {
        let mut env = EnvironmentRecord {
            aws_access_key: "AKIA".to_string(),
            ..Default::default()
        };
        assert!(env.aws_credentials().is_none());

        env.aws_secret_key = "secret".to_string();
        assert_eq!(env.aws_credentials(), Some(("AKIA", "secret")));
    }

    #[test]
    fn test_repo_details_default_branch() {
        let env = EnvironmentRecord {
            git_url: "git@github.com:org/site.git".to_string(),
            ..Default::default()
        };
        let details = env.repo_details();
        assert_eq!(details.url, "git@github.com:org/site.git");
        assert_eq!(details.branch, "master");
    }
}
