use crate::cli::progress::Stage;
use crate::console::commands::legacy::{with_spinner, LegacyTarget};
use crate::console::commands::CallableTrait;

/// `localdev legacy rm <name> <environment>`
///
/// `compose down`, or removal of every matching container when the
/// compose file is gone.
pub struct RmCommand {
    pub target: LegacyTarget,
}

impl RmCommand {
    pub fn new(target: LegacyTarget) -> Self {
        Self { target }
    }
}

impl CallableTrait for RmCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut app = self.target.open()?;
        with_spinner(&self.target.label(), Stage::Teardown, || {
            app.teardown_and_cleanup()
        })?;
        Ok(())
    }
}
