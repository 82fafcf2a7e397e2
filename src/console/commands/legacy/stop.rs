use crate::cli::progress::Stage;
use crate::console::commands::legacy::{with_spinner, LegacyTarget};
use crate::console::commands::CallableTrait;

/// `localdev legacy stop <name> <environment>`
///
/// Stops the containers; they and their volumes stay around for `start`.
pub struct StopCommand {
    pub target: LegacyTarget,
}

impl StopCommand {
    pub fn new(target: LegacyTarget) -> Self {
        Self { target }
    }
}

impl CallableTrait for StopCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut app = self.target.open()?;
        with_spinner(&self.target.label(), Stage::Stop, || app.stop())?;
        Ok(())
    }
}
