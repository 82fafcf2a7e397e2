use std::path::{Path, PathBuf};

use super::LegacyApp;
use crate::cli::error::LegacyError;
use crate::helpers::{select_current_archive, ObjectStoreCredentials};
use crate::models::EnvironmentRecord;

/// Files the archive may carry that must never replace local ones.
const PROTECTED_FILES: [&str; 2] = ["sites/default/settings.php", "wp-config.php"];

impl LegacyApp {
    /// `<name>/<environment>-<name>-`
    pub fn archive_prefix(&self) -> String {
        format!("{}/{}-{}-", self.name, self.environment, self.name)
    }

    /// Download the current archive into the working directory.
    #[tracing::instrument(name = "Fetch archive", skip(self), fields(name = %self.name, environment = %self.environment))]
    pub fn fetch_resources(&mut self) -> Result<PathBuf, LegacyError> {
        self.deps.cancellation.check()?;

        let record = self.deps.config_store.record(&self.name)?;
        let env = record.environment(&self.environment)?;

        let credentials = self.resolve_credentials(&env)?;
        let bucket = if env.aws_bucket.is_empty() {
            self.deps.default_bucket.clone()
        } else {
            env.aws_bucket.clone()
        };

        let store = self.deps.object_stores.connect(&bucket, credentials)?;
        let prefix = self.archive_prefix();
        let archive = select_current_archive(store.list_objects(&prefix)?)
            .ok_or_else(|| LegacyError::NoArchiveAvailable {
                bucket: bucket.clone(),
                prefix: prefix.clone(),
            })?;

        let workdir = self.resolve_paths();
        std::fs::create_dir_all(&workdir)?;
        let dest = workdir.join(archive.file_name());

        tracing::info!("Downloading s3://{}/{}", bucket, archive.key);
        let bytes = store.download(&archive.key, &dest)?;
        tracing::info!("Fetched {} ({} bytes)", dest.display(), bytes);

        self.archive_path = Some(dest.clone());
        Ok(dest)
    }

    /// Keys from the databag, else the shared secret.
    fn resolve_credentials(
        &self,
        env: &EnvironmentRecord,
    ) -> Result<ObjectStoreCredentials, LegacyError> {
        if let Some((access_key, secret_key)) = env.aws_credentials() {
            return Ok(ObjectStoreCredentials {
                access_key: access_key.to_string(),
                secret_key: secret_key.to_string(),
            });
        }

        let path = &self.deps.aws_secret_path;
        tracing::debug!("Databag has no object store keys, reading {}", path);

        let secret = self.deps.secret_store.read_secret(path).map_err(|e| match e {
            LegacyError::CredentialsUnavailable(_) | LegacyError::Cancelled => e,
            other => LegacyError::CredentialsUnavailable(format!("{path}: {other}")),
        })?;

        let field = |key: &str| {
            secret
                .get(key)
                .and_then(|v| v.as_str())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| LegacyError::CredentialsUnavailable(format!("{path} has no '{key}'")))
        };

        Ok(ObjectStoreCredentials {
            access_key: field("accesskey")?,
            secret_key: field("secretkey")?,
        })
    }

    /// Extract the fetched archive and sync its docroot into `src/docroot`.
    ///
    /// The archive is removed only once every step succeeded.
    #[tracing::instrument(name = "Unpack archive", skip(self), fields(name = %self.name, environment = %self.environment))]
    pub fn unpack_resources(&mut self) -> Result<(), LegacyError> {
        self.deps.cancellation.check()?;

        let archive = self
            .archive_path
            .clone()
            .ok_or_else(|| LegacyError::ExtractionFailed {
                archive: PathBuf::new(),
                output: "no archive fetched".to_string(),
            })?;

        self.prepare_workspace()?;
        self.extract(&archive)?;
        self.move_database_dump(&archive)?;
        self.sync_docroot()?;

        std::fs::remove_file(&archive)?;
        self.archive_path = None;
        tracing::info!("Unpacked {}", archive.display());
        Ok(())
    }

    fn extract(&self, archive: &Path) -> Result<(), LegacyError> {
        let archive_str = archive.to_string_lossy();
        let files_dir = self.files_dir();
        let files_str = files_dir.to_string_lossy();

        let excludes = exclude_flags();
        let mut args = vec!["-xzvf", archive_str.as_ref(), "-C", files_str.as_ref()];
        args.extend(excludes.iter().map(String::as_str));

        let output = self.deps.runtime.run_host_command("tar", &args)?;
        if !output.success() {
            return Err(LegacyError::ExtractionFailed {
                archive: archive.to_path_buf(),
                output: output.combined(),
            });
        }
        Ok(())
    }

    fn move_database_dump(&self, archive: &Path) -> Result<(), LegacyError> {
        let dump = format!("{}.sql", self.name);
        let from = self.files_dir().join(&dump);

        if !from.exists() {
            return Err(LegacyError::ExtractionFailed {
                archive: archive.to_path_buf(),
                output: format!("archive has no {dump}"),
            });
        }

        std::fs::rename(&from, self.data_dir().join(&dump))?;
        Ok(())
    }

    fn sync_docroot(&self) -> Result<(), LegacyError> {
        // Trailing slash: copy the directory's contents, not the directory.
        let source = format!("{}/", self.files_dir().join("docroot").to_string_lossy());
        let target = self.docroot().to_string_lossy().to_string();

        let excludes = exclude_flags();
        let mut args = vec!["-avz", "--recursive", "--exclude=profiles"];
        args.extend(excludes.iter().map(String::as_str));
        args.push(source.as_str());
        args.push(target.as_str());

        let output = self.deps.runtime.run_host_command("rsync", &args)?;
        if !output.success() {
            return Err(LegacyError::SyncFailed {
                output: output.combined(),
            });
        }
        Ok(())
    }
}

fn exclude_flags() -> Vec<String> {
    PROTECTED_FILES
        .iter()
        .map(|f| format!("--exclude={f}"))
        .collect()
}
