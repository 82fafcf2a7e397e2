mod app_settings;
mod app_type;
pub mod databag;

pub use app_settings::*;
pub use app_type::AppType;
pub use databag::{AppRecord, ConfigStore, EnvironmentRecord, RepoDetails, SecretStore};
