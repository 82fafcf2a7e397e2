use crate::cli::progress::Stage;
use crate::console::commands::legacy::{with_spinner, LegacyTarget};
use crate::console::commands::CallableTrait;

/// `localdev legacy config <name> <environment>`
///
/// Regenerates settings.php / wp-config.php against the running containers.
pub struct ConfigCommand {
    pub target: LegacyTarget,
}

impl ConfigCommand {
    pub fn new(target: LegacyTarget) -> Self {
        Self { target }
    }
}

impl CallableTrait for ConfigCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut app = self.target.open()?;
        with_spinner(&self.target.label(), Stage::Configure, || {
            app.generate_config()
        })?;
        Ok(())
    }
}
