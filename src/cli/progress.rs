//! Terminal progress helpers — spinners for lifecycle stages.
//!
//! Uses `indicatif` to show animated spinners while archives download,
//! containers start, and the readiness poll runs.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// ── Spinner presets ──────────────────────────────────

/// Braille dots — clean, modern feel.
const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars(TICK_CHARS)
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn finished_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Create an animated spinner with the given message.
///
/// Call one of the helpers (`finish_success`, `finish_error`) when done.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(spinner_style());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Spinner for one lifecycle stage of an app.
pub fn stage_spinner(app: &str, stage: Stage) -> ProgressBar {
    spinner(&format!("{}: {}", app, stage.describe()))
}

// ── Finish helpers ───────────────────────────────────

/// Finish a spinner with a green check-mark.
pub fn finish_success(pb: &ProgressBar, msg: &str) {
    pb.set_style(finished_style());
    pb.finish_with_message(format!("✓ {}", msg));
}

/// Finish a spinner with a red cross.
pub fn finish_error(pb: &ProgressBar, msg: &str) {
    pb.set_style(finished_style());
    pb.finish_with_message(format!("✗ {}", msg));
}

// ── Stages ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Unpack,
    Compose,
    Start,
    Configure,
    Wait,
    Stop,
    Teardown,
}

impl Stage {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Fetch => "downloading archive",
            Self::Unpack => "unpacking archive",
            Self::Compose => "writing docker-compose.yaml",
            Self::Start => "starting containers",
            Self::Configure => "generating settings",
            Self::Wait => "waiting for the site to respond",
            Self::Stop => "stopping containers",
            Self::Teardown => "removing containers",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_descriptions() {
        assert_eq!(Stage::Fetch.describe(), "downloading archive");
        assert_eq!(Stage::Teardown.describe(), "removing containers");
    }
}
