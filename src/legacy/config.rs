use super::LegacyApp;
use crate::cli::error::LegacyError;
use crate::helpers::secret::{make_secret, HASH_SALT_LENGTH};
use crate::models::{
    AppType, DrupalSettings, DrushSettings, EnvironmentRecord, WordpressSettings,
    DATABASE_SERVICE_HOST,
};

impl LegacyApp {
    /// Resolve both published ports from the running containers.
    pub fn resolve_ports(&mut self) -> Result<(u16, u16), LegacyError> {
        let web = self.deps.runtime.published_port(&self.web_container())?;
        let db = self.deps.runtime.published_port(&self.db_container())?;
        self.web_port = Some(web);
        self.db_port = Some(db);
        tracing::debug!("{} listens on web {} / db {}", self.container_name(), web, db);
        Ok((web, db))
    }

    /// Write the CMS settings files for the running containers.
    #[tracing::instrument(name = "Generate app config", skip(self), fields(name = %self.name, environment = %self.environment))]
    pub fn generate_config(&mut self) -> Result<(), LegacyError> {
        self.deps.cancellation.check()?;

        let app_type = match self.app_type {
            Some(app_type) => app_type,
            None => self.set_type()?,
        };

        if app_type == AppType::Unknown {
            tracing::warn!("No config generator for {} ({})", self.name, app_type);
            return Err(LegacyError::UnsupportedAppType { app_type });
        }

        let record = self.deps.config_store.record(&self.name)?;
        let env = record.environment(&self.environment)?;
        let (web_port, db_port) = self.resolve_ports()?;
        let deploy_url = format!("http://localhost:{web_port}");

        match app_type {
            AppType::Drupal => self.write_drupal_config(&env, deploy_url, db_port),
            AppType::Wordpress => self.write_wordpress_config(&env, deploy_url),
            AppType::Unknown => Err(LegacyError::UnsupportedAppType { app_type }),
        }
    }

    fn write_drupal_config(
        &self,
        env: &EnvironmentRecord,
        deploy_url: String,
        db_port: u16,
    ) -> Result<(), LegacyError> {
        let hash_salt = if env.hash_salt.is_empty() {
            make_secret(HASH_SALT_LENGTH)
        } else {
            env.hash_salt.clone()
        };

        let settings = DrupalSettings {
            database_host: DATABASE_SERVICE_HOST.to_string(),
            hash_salt,
            deploy_url,
            ..DrupalSettings::default()
        };
        let path = self.docroot().join("sites/default/settings.php");
        let content = self.deps.renderer.render_drupal(&settings, &path)?;
        self.deps.renderer.write(&path, &content)?;

        let drush = DrushSettings {
            database_port: db_port,
            ..DrushSettings::default()
        };
        let drush_path = self.src_dir().join("drush.settings.php");
        let content = self.deps.renderer.render_drush(&drush, &drush_path)?;
        self.deps.renderer.write(&drush_path, &content)?;

        tracing::info!("Wrote Drupal settings for {}", self.container_name());
        Ok(())
    }

    fn write_wordpress_config(
        &self,
        env: &EnvironmentRecord,
        deploy_url: String,
    ) -> Result<(), LegacyError> {
        let settings = WordpressSettings {
            database_host: DATABASE_SERVICE_HOST.to_string(),
            deploy_url,
            auth_key: env.auth_key.clone(),
            auth_salt: env.auth_salt.clone(),
            logged_in_key: env.logged_in_key.clone(),
            logged_in_salt: env.logged_in_salt.clone(),
            nonce_key: env.nonce_key.clone(),
            nonce_salt: env.nonce_salt.clone(),
            secure_auth_key: env.secure_auth_key.clone(),
            secure_auth_salt: env.secure_auth_salt.clone(),
            ..WordpressSettings::default()
        };
        let path = self.docroot().join("wp-config.php");
        let content = self.deps.renderer.render_wordpress(&settings, &path)?;
        self.deps.renderer.write(&path, &content)?;

        tracing::info!("Wrote wp-config.php for {}", self.container_name());
        Ok(())
    }
}
