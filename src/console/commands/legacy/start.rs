use crate::cli::progress::Stage;
use crate::console::commands::legacy::{with_spinner, LegacyTarget};
use crate::console::commands::CallableTrait;

/// `localdev legacy start <name> <environment>`
pub struct StartCommand {
    pub target: LegacyTarget,
}

impl StartCommand {
    pub fn new(target: LegacyTarget) -> Self {
        Self { target }
    }
}

impl CallableTrait for StartCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut app = self.target.open()?;
        let label = self.target.label();

        with_spinner(&label, Stage::Start, || app.start())?;
        let url = with_spinner(&label, Stage::Wait, || app.wait_until_ready())?;
        println!("{}", url);

        Ok(())
    }
}
