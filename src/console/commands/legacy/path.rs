use std::path::PathBuf;

use crate::console::commands::legacy::LegacyTarget;
use crate::console::commands::CallableTrait;

/// `localdev legacy path <name> <environment> [--relative]`
///
/// Prints the app's working directory.
pub struct PathCommand {
    pub target: LegacyTarget,
    pub relative: bool,
}

impl PathCommand {
    pub fn new(target: LegacyTarget, relative: bool) -> Self {
        Self { target, relative }
    }

    pub fn resolve(&self) -> anyhow::Result<PathBuf> {
        let app = self.target.open()?;
        Ok(if self.relative {
            app.rel_path()
        } else {
            app.resolve_paths()
        })
    }
}

impl CallableTrait for PathCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        println!("{}", self.resolve()?.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::commands::legacy::tests::target_with_home;

    #[test]
    fn test_path_absolute_and_relative() {
        let home = tempfile::TempDir::new().unwrap();
        let (target, _file) = target_with_home(home.path());

        let absolute = PathCommand::new(target.clone(), false).resolve().unwrap();
        assert_eq!(absolute, home.path().join(".localdev/legacy/foo-prod"));

        let relative = PathCommand::new(target, true).resolve().unwrap();
        assert_eq!(relative, PathBuf::from("legacy/foo-prod"));
    }
}
