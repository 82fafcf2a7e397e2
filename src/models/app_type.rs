use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AppType — CMS flavours a legacy app can be
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    Drupal,
    #[serde(alias = "wp")]
    Wordpress,
    Unknown,
}

impl AppType {
    /// Suffix of the web image for this type (`drud/nginx-php-fpm-<tag>`).
    pub fn image_tag(&self) -> Option<&'static str> {
        match self {
            Self::Drupal => Some("drupal"),
            Self::Wordpress => Some("wp"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drupal => write!(f, "drupal"),
            Self::Wordpress => write!(f, "wordpress"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for AppType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "drupal" | "drupal7" | "drupal8" => Self::Drupal,
            "wordpress" | "wp" => Self::Wordpress,
            _ => Self::Unknown,
        })
    }
}
