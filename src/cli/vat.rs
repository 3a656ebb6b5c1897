use std::path::Path;

use comfy_table::{Cell, Table};

use salesplit::error::Result;
use salesplit::fmt::percent;
use salesplit::settings::load_settings;

pub fn list(config: &Path) -> Result<()> {
    let settings = load_settings(config)?;

    let mut table = Table::new();
    table.set_header(vec!["Country", "VAT"]);
    for (country, rate) in settings.vat.iter() {
        table.add_row(vec![Cell::new(country), Cell::new(percent(rate))]);
    }
    println!("VAT rates ({} countries)\n{table}", settings.vat.len());
    println!("Country names must match the sales export exactly, including case.");
    Ok(())
}
