//! Archive storage backend using the rust-s3 crate.
//!
//! Credentials are always handed in explicitly through
//! [`ObjectStoreCredentials`]; the process environment is never consulted
//! or mutated, so concurrent runs against different buckets stay isolated.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use tokio::io::AsyncWriteExt;

use crate::cli::cancel::Cancellation;
use crate::cli::error::LegacyError;
use crate::configuration::ObjectStoreSettings;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone, PartialEq, Eq)]
pub struct ObjectStoreCredentials {
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for ObjectStoreCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

/// One object of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
}

impl ArchiveObject {
    /// Last path segment of the key, used as the local file name.
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

/// The most recently modified object; equal timestamps fall back to the
/// greatest key.
pub fn select_current_archive(objects: Vec<ArchiveObject>) -> Option<ArchiveObject> {
    objects
        .into_iter()
        .max_by(|a, b| {
            a.last_modified
                .cmp(&b.last_modified)
                .then_with(|| a.key.cmp(&b.key))
        })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Traits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A bucket handle bound to one set of credentials.
pub trait ObjectStore {
    fn list_objects(&self, prefix: &str) -> Result<Vec<ArchiveObject>, LegacyError>;
    /// Download `key` into `dest`, returning the number of bytes written.
    fn download(&self, key: &str, dest: &Path) -> Result<u64, LegacyError>;
}

/// Opens bucket handles. The orchestrator only ever talks to this.
pub trait ObjectStoreFactory: Send + Sync {
    fn connect(
        &self,
        bucket: &str,
        credentials: ObjectStoreCredentials,
    ) -> Result<Box<dyn ObjectStore>, LegacyError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// S3 implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const CANCEL_POLL: Duration = Duration::from_millis(100);

pub struct S3Factory {
    region: String,
    endpoint: Option<String>,
    timeout: Duration,
    cancellation: Cancellation,
}

impl S3Factory {
    pub fn new(settings: &ObjectStoreSettings, timeout: Duration, cancellation: Cancellation) -> Self {
        Self {
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
            timeout,
            cancellation,
        }
    }

    fn region(&self) -> Result<Region, LegacyError> {
        match &self.endpoint {
            Some(endpoint) => Ok(Region::Custom {
                region: self.region.clone(),
                endpoint: endpoint.clone(),
            }),
            None => self
                .region
                .parse()
                .map_err(|_| LegacyError::StoreUnavailable(format!("Invalid S3 region: {}", self.region))),
        }
    }
}

impl ObjectStoreFactory for S3Factory {
    fn connect(
        &self,
        bucket: &str,
        credentials: ObjectStoreCredentials,
    ) -> Result<Box<dyn ObjectStore>, LegacyError> {
        let creds = Credentials::new(
            Some(credentials.access_key.as_str()),
            Some(credentials.secret_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| LegacyError::CredentialsUnavailable(format!("Invalid S3 credentials: {e}")))?;

        let handle = Bucket::new(bucket, self.region()?, creds)
            .map_err(|e| LegacyError::StoreUnavailable(format!("Failed to open bucket {bucket}: {e}")))?;

        // Custom endpoints are S3-compatible services that expect path-style URLs.
        let handle = if self.endpoint.is_some() {
            handle.with_path_style()
        } else {
            handle
        };

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        tracing::debug!(bucket = %bucket, region = %self.region, "Opened S3 bucket");

        Ok(Box::new(S3ObjectStore {
            bucket: handle,
            runtime,
            timeout: self.timeout,
            cancellation: self.cancellation.clone(),
        }))
    }
}

pub struct S3ObjectStore {
    bucket: Box<Bucket>,
    runtime: tokio::runtime::Runtime,
    timeout: Duration,
    cancellation: Cancellation,
}

impl S3ObjectStore {
    /// Drive `fut` to completion unless the deadline passes or the run is
    /// cancelled first. A missed deadline fails the transfer of `key`.
    fn block_on<T, F>(&self, key: &str, fut: F) -> Result<T, LegacyError>
    where
        F: std::future::Future<Output = Result<T, LegacyError>>,
    {
        let cancellation = self.cancellation.clone();
        let timeout = self.timeout;

        self.runtime.block_on(async move {
            let cancelled = async {
                while !cancellation.is_cancelled() {
                    tokio::time::sleep(CANCEL_POLL).await;
                }
            };

            tokio::select! {
                result = tokio::time::timeout(timeout, fut) => result.map_err(|_| LegacyError::DownloadFailed {
                    key: key.to_string(),
                    reason: format!("timed out after {}s", timeout.as_secs_f32()),
                })?,
                _ = cancelled => Err(LegacyError::Cancelled),
            }
        })
    }
}

impl ObjectStore for S3ObjectStore {
    fn list_objects(&self, prefix: &str) -> Result<Vec<ArchiveObject>, LegacyError> {
        let bucket = &self.bucket;
        let results = self.block_on(prefix, async {
            bucket
                .list(prefix.to_string(), None)
                .await
                .map_err(|e| LegacyError::DownloadFailed {
                    key: prefix.to_string(),
                    reason: format!("listing failed: {e}"),
                })
        })?;

        let objects: Vec<ArchiveObject> = results
            .into_iter()
            .flat_map(|result| result.contents)
            .map(|obj| ArchiveObject {
                last_modified: parse_last_modified(&obj.last_modified),
                key: obj.key,
                size: obj.size,
            })
            .collect();

        tracing::debug!(prefix = %prefix, count = objects.len(), "S3 list objects successful");
        Ok(objects)
    }

    fn download(&self, key: &str, dest: &Path) -> Result<u64, LegacyError> {
        let bucket = &self.bucket;
        let download_failed = |reason: String| LegacyError::DownloadFailed {
            key: key.to_string(),
            reason,
        };

        let result = self.block_on(key, async {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| download_failed(e.to_string()))?;

            let status = bucket
                .get_object_to_writer(key, &mut file)
                .await
                .map_err(|e| download_failed(e.to_string()))?;

            if status != 200 {
                return Err(download_failed(format!("HTTP {status}")));
            }
            file.flush().await.map_err(|e| download_failed(e.to_string()))?;

            let meta = file
                .metadata()
                .await
                .map_err(|e| download_failed(e.to_string()))?;
            Ok(meta.len())
        });

        if result.is_err() && dest.exists() {
            let _ = std::fs::remove_file(dest);
        }

        let bytes = result?;
        tracing::info!(key = %key, bytes, "Downloaded archive");
        Ok(bytes)
    }
}

/// S3 reports RFC 3339 timestamps; an unparsable value sorts as oldest.
fn parse_last_modified(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn object(key: &str, ts: i64) -> ArchiveObject {
        ArchiveObject {
            key: key.to_string(),
            last_modified: Utc.timestamp_opt(ts, 0).unwrap(),
            size: 1,
        }
    }

    #[test]
    fn test_select_latest_by_timestamp() {
        let selected = select_current_archive(vec![
            object("foo/prod-foo-2024.tar.gz", 300),
            object("foo/prod-foo-2023.tar.gz", 100),
            object("foo/prod-foo-2022.tar.gz", 200),
        ])
        .unwrap();
        assert_eq!(selected.key, "foo/prod-foo-2024.tar.gz");
    }

    #[test]
    fn test_select_ties_broken_by_key() {
        let selected = select_current_archive(vec![
            object("foo/prod-foo-a.tar.gz", 100),
            object("foo/prod-foo-b.tar.gz", 100),
        ])
        .unwrap();
        assert_eq!(selected.key, "foo/prod-foo-b.tar.gz");
    }

    #[test]
    fn test_select_empty_listing() {
        assert!(select_current_archive(Vec::new()).is_none());
    }

    #[test]
    fn test_file_name_strips_directories() {
        assert_eq!(object("foo/prod-foo-1.tar.gz", 0).file_name(), "prod-foo-1.tar.gz");
        assert_eq!(object("flat.tar.gz", 0).file_name(), "flat.tar.gz");
    }

    #[test]
    fn test_parse_last_modified() {
        let parsed = parse_last_modified("2024-03-01T12:00:00.000Z");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        assert_eq!(parse_last_modified("garbage"), DateTime::<Utc>::default());
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let creds = ObjectStoreCredentials {
            access_key: "AKIA".to_string(),
            secret_key: "very-secret".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("AKIA"));
        assert!(!debug.contains("very-secret"));
    }

    fn store_at(endpoint: String, timeout: Duration) -> Box<dyn ObjectStore> {
        let settings = ObjectStoreSettings {
            endpoint: Some(endpoint),
            ..ObjectStoreSettings::default()
        };
        let creds = ObjectStoreCredentials {
            access_key: "minio".to_string(),
            secret_key: "minio123".to_string(),
        };
        S3Factory::new(&settings, timeout, Cancellation::new())
            .connect("nmdarchive", creds)
            .unwrap()
    }

    #[test]
    fn test_list_error_is_download_failed() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(500)
            .with_body("<Error><Code>InternalError</Code></Error>")
            .create();

        let store = store_at(server.url(), Duration::from_secs(5));
        let err = store.list_objects("foo/prod-foo-").unwrap_err();
        assert!(matches!(
            err,
            LegacyError::DownloadFailed { ref key, .. } if key == "foo/prod-foo-"
        ));
    }

    #[test]
    fn test_stalled_transfers_time_out_as_download_failed() {
        // Accepts connections but never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let store = store_at(endpoint, Duration::from_millis(200));

        let err = store.list_objects("foo/prod-foo-").unwrap_err();
        assert!(matches!(err, LegacyError::DownloadFailed { .. }));

        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("prod-foo-1.tar.gz");
        let err = store.download("foo/prod-foo-1.tar.gz", &dest).unwrap_err();
        assert!(matches!(
            err,
            LegacyError::DownloadFailed { ref key, ref reason } if key == "foo/prod-foo-1.tar.gz" && reason.contains("timed out")
        ));
        assert!(!dest.exists());
    }

    #[test]
    fn test_factory_connects_with_custom_endpoint() {
        let settings = ObjectStoreSettings {
            endpoint: Some("http://127.0.0.1:9000".to_string()),
            ..ObjectStoreSettings::default()
        };
        let factory = S3Factory::new(&settings, Duration::from_secs(5), Cancellation::new());
        let creds = ObjectStoreCredentials {
            access_key: "minio".to_string(),
            secret_key: "minio123".to_string(),
        };
        assert!(factory.connect("nmdarchive", creds).is_ok());
    }
}
