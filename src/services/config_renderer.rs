//! ConfigRenderer Service - compose and CMS settings files
//!
//! Turns the settings models into the files a legacy app needs on disk
//! using Tera templates:
//! 1. `docker-compose.yaml` from the (overridable) compose template
//! 2. `sites/default/settings.php` and `drush.settings.php` for Drupal
//! 3. `wp-config.php` for WordPress

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tera::{Context as TeraContext, Tera, Value};

use crate::cli::error::LegacyError;
use crate::models::{DrupalSettings, DrushSettings, WordpressSettings};

const DRUPAL_SETTINGS: &str = "settings.php.tera";
const DRUSH_SETTINGS: &str = "drush.settings.php.tera";
const WORDPRESS_CONFIG: &str = "wp-config.php.tera";

/// ConfigRenderer - renders legacy app configuration files
pub struct ConfigRenderer {
    tera: Tera,
}

impl ConfigRenderer {
    /// Create a new ConfigRenderer with embedded templates
    pub fn new() -> Result<Self, LegacyError> {
        let mut tera = Tera::default();
        // PHP and YAML output; HTML escaping would corrupt salts.
        tera.autoescape_on(vec![]);
        tera.register_filter("php_str", php_str);

        for (name, body) in [
            (DRUPAL_SETTINGS, DRUPAL_SETTINGS_TEMPLATE),
            (DRUSH_SETTINGS, DRUSH_SETTINGS_TEMPLATE),
            (WORDPRESS_CONFIG, WORDPRESS_CONFIG_TEMPLATE),
        ] {
            tera.add_raw_template(name, body)
                .map_err(|e| LegacyError::ConfigRender {
                    path: name.into(),
                    reason: format!("invalid template: {e}"),
                })?;
        }

        Ok(Self { tera })
    }

    /// Render a compose template with `image` and `name` in scope.
    pub fn render_compose(
        &self,
        template: &str,
        image: &str,
        name: &str,
        dest: &Path,
    ) -> Result<String, LegacyError> {
        let mut context = TeraContext::new();
        context.insert("image", image);
        context.insert("name", name);

        Tera::one_off(template, &context, false).map_err(|e| render_error(dest, e))
    }

    pub fn render_drupal(&self, settings: &DrupalSettings, dest: &Path) -> Result<String, LegacyError> {
        self.render_model(DRUPAL_SETTINGS, settings, dest)
    }

    pub fn render_drush(&self, settings: &DrushSettings, dest: &Path) -> Result<String, LegacyError> {
        self.render_model(DRUSH_SETTINGS, settings, dest)
    }

    pub fn render_wordpress(
        &self,
        settings: &WordpressSettings,
        dest: &Path,
    ) -> Result<String, LegacyError> {
        self.render_model(WORDPRESS_CONFIG, settings, dest)
    }

    /// Render and write in one go, creating parent directories.
    pub fn write(&self, dest: &Path, content: &str) -> Result<(), LegacyError> {
        let write_error = |e: std::io::Error| LegacyError::ConfigRender {
            path: dest.to_path_buf(),
            reason: e.to_string(),
        };

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(dest, content).map_err(write_error)?;

        tracing::debug!("Wrote {}", dest.display());
        Ok(())
    }

    fn render_model<T: Serialize>(
        &self,
        template: &str,
        model: &T,
        dest: &Path,
    ) -> Result<String, LegacyError> {
        let context = TeraContext::from_serialize(model).map_err(|e| render_error(dest, e))?;
        self.tera
            .render(template, &context)
            .map_err(|e| render_error(dest, e))
    }
}

/// Escape a value for a single-quoted PHP literal.
fn php_str(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Ok(Value::String(escape_php_single_quoted(&raw)))
}

fn escape_php_single_quoted(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

fn render_error(dest: &Path, e: tera::Error) -> LegacyError {
    // Tera nests the useful message in the source chain.
    let mut reason = e.to_string();
    let mut source = std::error::Error::source(&e);
    while let Some(inner) = source {
        reason = format!("{reason}: {inner}");
        source = inner.source();
    }

    LegacyError::ConfigRender {
        path: dest.to_path_buf(),
        reason,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Templates
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Compose file used when no custom template is configured.
pub const DEFAULT_COMPOSE_TEMPLATE: &str = r#"version: '2'
services:
  db:
    container_name: {{ name }}-db
    image: drud/mysql-docker-local:5.7
    volumes:
      - "./data:/db"
    restart: always
    environment:
      MYSQL_DATABASE: data
      MYSQL_ROOT_PASSWORD: root
    ports:
      - "3306"
  web:
    container_name: {{ name }}-web
    image: {{ image }}
    volumes:
      - "./src:/var/www/html"
      - "./files:/files"
    restart: always
    depends_on:
      - db
    links:
      - db:db
    ports:
      - "80"
    working_dir: "/var/www/html/docroot"
    environment:
      - DEPLOY_NAME=local
"#;

const DRUPAL_SETTINGS_TEMPLATE: &str = r#"<?php
// Generated by localdev. Local changes are overwritten on the next run.

$databases = array(
  'default' => array(
    'default' => array(
      'database' => '{{ database_name | php_str }}',
      'username' => '{{ database_username | php_str }}',
      'password' => '{{ database_password | php_str }}',
      'host' => '{{ database_host | php_str }}',
      'driver' => '{{ database_driver | php_str }}',
      'port' => {{ database_port }},
      'prefix' => '{{ database_prefix | php_str }}',
    ),
  ),
);

$drupal_hash_salt = '{{ hash_salt | php_str }}';
$settings['hash_salt'] = '{{ hash_salt | php_str }}';

$base_url = '{{ deploy_url | php_str }}';

$conf['file_temporary_path'] = '/tmp';
$settings['file_temp_path'] = '/tmp';

if (file_exists(__DIR__ . '/settings.local.php')) {
  include __DIR__ . '/settings.local.php';
}
"#;

const DRUSH_SETTINGS_TEMPLATE: &str = r#"<?php
// Generated by localdev. Used by drush running on the host.

$databases['default']['default'] = array(
  'database' => '{{ database_name | php_str }}',
  'username' => '{{ database_username | php_str }}',
  'password' => '{{ database_password | php_str }}',
  'host' => '{{ database_host | php_str }}',
  'port' => {{ database_port }},
  'driver' => 'mysql',
  'prefix' => '',
);
"#;

const WORDPRESS_CONFIG_TEMPLATE: &str = r#"<?php
// Generated by localdev. Local changes are overwritten on the next run.

define('DB_NAME', '{{ database_name | php_str }}');
define('DB_USER', '{{ database_username | php_str }}');
define('DB_PASSWORD', '{{ database_password | php_str }}');
define('DB_HOST', '{{ database_host | php_str }}');
define('DB_CHARSET', 'utf8');
define('DB_COLLATE', '');

define('AUTH_KEY',         '{{ auth_key | php_str }}');
define('SECURE_AUTH_KEY',  '{{ secure_auth_key | php_str }}');
define('LOGGED_IN_KEY',    '{{ logged_in_key | php_str }}');
define('NONCE_KEY',        '{{ nonce_key | php_str }}');
define('AUTH_SALT',        '{{ auth_salt | php_str }}');
define('SECURE_AUTH_SALT', '{{ secure_auth_salt | php_str }}');
define('LOGGED_IN_SALT',   '{{ logged_in_salt | php_str }}');
define('NONCE_SALT',       '{{ nonce_salt | php_str }}');

$table_prefix = '{{ table_prefix | php_str }}';

define('WP_HOME', '{{ deploy_url | php_str }}');
define('WP_SITEURL', '{{ deploy_url | php_str }}');

define('WP_DEBUG', false);

if ( !defined('ABSPATH') )
	define('ABSPATH', dirname(__FILE__) . '/');

require_once(ABSPATH . 'wp-settings.php');
"#;
