use crate::cli::progress::Stage;
use crate::console::commands::legacy::{with_spinner, LegacyTarget};
use crate::console::commands::CallableTrait;

/// `localdev legacy ready <name> <environment>`
///
/// Blocks until the site answers 200, then prints its URL.
pub struct ReadyCommand {
    pub target: LegacyTarget,
}

impl ReadyCommand {
    pub fn new(target: LegacyTarget) -> Self {
        Self { target }
    }
}

impl CallableTrait for ReadyCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut app = self.target.open()?;
        let url = with_spinner(&self.target.label(), Stage::Wait, || app.wait_until_ready())?;
        println!("{}", url);
        Ok(())
    }
}
