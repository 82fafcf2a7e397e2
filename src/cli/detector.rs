use std::path::Path;

use crate::cli::error::LegacyError;
use crate::models::AppType;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FileSystem trait — abstraction for testability (DIP)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// Production filesystem using std::fs.
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Detection markers — which files map to which CMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct DetectionMarker {
    /// Path relative to the docroot.
    path: &'static str,
    app_type: AppType,
}

/// Checked in order; the first marker present wins.
const DETECTION_MARKERS: &[DetectionMarker] = &[
    DetectionMarker {
        path: "core/scripts/drupal.sh",
        app_type: AppType::Drupal,
    },
    DetectionMarker {
        path: "scripts/drupal.sh",
        app_type: AppType::Drupal,
    },
    DetectionMarker {
        path: "wp-settings.php",
        app_type: AppType::Wordpress,
    },
    DetectionMarker {
        path: "wp-includes",
        app_type: AppType::Wordpress,
    },
];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// detect_app_type — identify the CMS behind an unpacked docroot
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Detect the CMS of an unpacked docroot.
///
/// Resources must already be fetched and unpacked; a missing docroot or a
/// tree without any known signature is `DetectionFailed`.
pub fn detect_app_type(docroot: &Path, fs: &dyn FileSystem) -> Result<AppType, LegacyError> {
    if !fs.exists(docroot) {
        return Err(LegacyError::DetectionFailed {
            path: docroot.to_path_buf(),
            reason: "path does not exist".to_string(),
        });
    }

    DETECTION_MARKERS
        .iter()
        .find(|marker| fs.exists(&docroot.join(marker.path)))
        .map(|marker| marker.app_type)
        .ok_or_else(|| LegacyError::DetectionFailed {
            path: docroot.to_path_buf(),
            reason: "no Drupal or WordPress signature found".to_string(),
        })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
