use std::path::{Path, PathBuf};

use salesplit::error::Result;
use salesplit::settings::{load_settings, shellexpand_path};

pub fn run(config: &Path) -> Result<()> {
    let settings = load_settings(config)?;

    let source = if config.exists() { "" } else { " (not found, using defaults)" };
    println!("Settings:     {}{source}", config.display());
    println!(
        "Columns:      date {}, country {}, total {}",
        settings.columns.date, settings.columns.country, settings.columns.total
    );
    println!("First row:    {}", settings.start_row);

    let template = PathBuf::from(shellexpand_path(&settings.files.template));
    let found = if template.exists() { "" } else { " (missing)" };
    println!("Template:     {}{found}", template.display());
    println!("Sales file:   {}<year>-<month>.xlsx", settings.files.sales_output);
    println!("Import file:  {}<year>-<month>.xlsx", settings.files.template_output);
    println!("VAT table:    {} countries", settings.vat.len());

    match settings.validate() {
        Ok(()) => println!("\nSettings are valid."),
        Err(e) => println!("\nSettings problem: {e}"),
    }
    Ok(())
}
