use serde::{Deserialize, Serialize};

/// Host name of the database service inside the compose network.
pub const DATABASE_SERVICE_HOST: &str = "db";

fn default_database_name() -> String {
    "data".to_string()
}

fn default_database_credential() -> String {
    "root".to_string()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DrupalSettings — context for sites/default/settings.php
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrupalSettings {
    pub database_name: String,
    pub database_username: String,
    pub database_password: String,
    pub database_host: String,
    pub database_driver: String,
    pub database_port: u16,
    pub database_prefix: String,
    pub hash_salt: String,
    pub deploy_url: String,
}

impl Default for DrupalSettings {
    fn default() -> Self {
        Self {
            database_name: default_database_name(),
            database_username: default_database_credential(),
            database_password: default_database_credential(),
            database_host: "127.0.0.1".to_string(),
            database_driver: "mysql".to_string(),
            database_port: 3306,
            database_prefix: String::new(),
            hash_salt: String::new(),
            deploy_url: String::new(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DrushSettings — context for src/drush.settings.php
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Drush runs on the host, so it reaches the database through the
/// published port instead of the compose service alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrushSettings {
    pub database_name: String,
    pub database_username: String,
    pub database_password: String,
    pub database_host: String,
    pub database_port: u16,
}

impl Default for DrushSettings {
    fn default() -> Self {
        Self {
            database_name: default_database_name(),
            database_username: default_database_credential(),
            database_password: default_database_credential(),
            database_host: "127.0.0.1".to_string(),
            database_port: 3306,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WordpressSettings — context for wp-config.php
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordpressSettings {
    pub database_name: String,
    pub database_username: String,
    pub database_password: String,
    pub database_host: String,
    pub table_prefix: String,
    pub deploy_url: String,
    pub auth_key: String,
    pub auth_salt: String,
    pub logged_in_key: String,
    pub logged_in_salt: String,
    pub nonce_key: String,
    pub nonce_salt: String,
    pub secure_auth_key: String,
    pub secure_auth_salt: String,
}

impl Default for WordpressSettings {
    fn default() -> Self {
        Self {
            database_name: default_database_name(),
            database_username: default_database_credential(),
            database_password: default_database_credential(),
            database_host: "127.0.0.1".to_string(),
            table_prefix: "wp_".to_string(),
            deploy_url: String::new(),
            auth_key: String::new(),
            auth_salt: String::new(),
            logged_in_key: String::new(),
            logged_in_salt: String::new(),
            nonce_key: String::new(),
            nonce_salt: String::new(),
            secure_auth_key: String::new(),
            secure_auth_salt: String::new(),
        }
    }
}
