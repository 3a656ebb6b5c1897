use std::path::Path;

use salesplit::error::{Result, SalesError};
use salesplit::settings::{save_settings, Settings};

pub fn run(config: &Path, force: bool) -> Result<()> {
    if config.exists() && !force {
        return Err(SalesError::Settings(format!(
            "{} already exists\nRun `salesplit init --force` to replace it with the defaults.",
            config.display()
        )));
    }

    let settings = Settings::default();
    save_settings(&settings, config)?;

    println!("Wrote default settings to {}", config.display());
    println!("Import template is expected at {}", settings.files.template);
    Ok(())
}
