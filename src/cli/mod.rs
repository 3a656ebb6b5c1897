pub mod init;
pub mod process;
pub mod status;
pub mod vat;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use salesplit::settings::{default_settings_path, shellexpand_path};

/// Resolve the settings file: `--config` when given, otherwise the default location.
pub(crate) fn settings_path(config: Option<&str>) -> PathBuf {
    config
        .map(|p| PathBuf::from(shellexpand_path(p)))
        .unwrap_or_else(default_settings_path)
}

#[derive(Parser)]
#[command(
    name = "salesplit",
    version,
    about = "Split a monthly sales export into EU (VAT) and non-EU spreadsheets."
)]
pub struct Cli {
    /// Settings file (default: ~/.config/salesplit/settings.json)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the default settings file (columns, file names, template layout, VAT rates).
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// Validate a sales export, split it by country and write the output workbooks.
    Process {
        /// Path to the sales report (XLSX, XLS, ODS or CSV)
        file: String,
        /// Month used in output file names (default: current month)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Year used in output file names (default: current year)
        #[arg(long)]
        year: Option<i32>,
        /// Import template to fill with non-EU sales (default: from settings)
        #[arg(long)]
        template: Option<String>,
        /// First data row (default: from settings, normally 2)
        #[arg(long)]
        start: Option<usize>,
        /// Last data row to read, inclusive
        #[arg(long)]
        stop: Option<usize>,
        /// Directory for the output workbooks (default: current directory)
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
    },
    /// List the configured VAT rates.
    Vat,
    /// Show the settings in use.
    Status,
}
