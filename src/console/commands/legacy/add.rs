use crate::cli::progress;
use crate::console::commands::legacy::LegacyTarget;
use crate::console::commands::CallableTrait;

/// `localdev legacy add <name> <environment>`
///
/// Fetches the latest archive, unpacks it, starts the containers, writes
/// the CMS settings and waits until the site answers.
pub struct AddCommand {
    pub target: LegacyTarget,
}

impl AddCommand {
    pub fn new(target: LegacyTarget) -> Self {
        Self { target }
    }
}

impl CallableTrait for AddCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut app = self.target.open()?;
        let label = self.target.label();

        let pb = progress::spinner(&format!("{}: preparing workspace", label));
        let result = app.add(|stage| pb.set_message(format!("{}: {}", label, stage.describe())));

        match result {
            Ok(url) => {
                progress::finish_success(&pb, &format!("{} is running", label));
                println!("{}", url);
                Ok(())
            }
            Err(e) => {
                progress::finish_error(&pb, &format!("{}: {}", label, e));
                Err(e.into())
            }
        }
    }
}
