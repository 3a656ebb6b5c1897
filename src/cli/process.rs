use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_xlsxwriter::Workbook;

use salesplit::error::{Result, SalesError};
use salesplit::extractor::{ExtractionSummary, RowExtractor, RowIssue};
use salesplit::fmt::money;
use salesplit::settings::{load_settings, shellexpand_path};
use salesplit::source::{open_sheet, read_workbook};
use salesplit::splitter::{split, suspicious_countries, CountryCounts, SalesSplit};
use salesplit::writer::{sales_workbook, template_workbook};

pub struct ProcessArgs {
    pub file: String,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub template: Option<String>,
    pub start: Option<usize>,
    pub stop: Option<usize>,
    pub output_dir: Option<String>,
}

pub fn run(config: &Path, args: &ProcessArgs) -> Result<()> {
    let settings = load_settings(config)?;
    settings.validate()?;
    let start = args.start.unwrap_or(settings.start_row);
    if start == 0 {
        return Err(SalesError::Other("--start must be 1 or greater".to_string()));
    }
    if let Some(stop) = args.stop.filter(|&stop| stop > 0 && stop < start) {
        return Err(SalesError::Other(format!(
            "--stop {stop} is before the first data row {start}"
        )));
    }

    println!("{}", "salesplit: EU / non-EU sales splitter".bold());
    println!();

    let file_path = PathBuf::from(shellexpand_path(&args.file));
    let sheet = open_sheet(&file_path)?;
    println!("Successfully opened \"{}\"", file_path.display());

    let columns = settings.columns.resolve()?;
    let headers = sheet.headers(&columns);
    println!("Getting data from the sheet '{}'", sheet.name);
    println!(
        "Columns to parse: {}, {}, {}\n",
        headers.date, headers.country, headers.total
    );

    println!("{}", "# Extracting sales:".bold());
    let extractor = RowExtractor::new(columns, headers);
    let extraction = extractor.run(sheet.rows_from(start), start, args.stop);
    print_issues(&extraction.issues);
    print_extraction_summary(&extraction.summary);

    if !extraction.all_valid {
        println!("{}", "[!] Please fix all X marks first.".red().bold());
        return Ok(());
    }
    println!("{}", "[+] All rows with data have been saved.".green());
    println!("No critical errors found. Going further...\n");

    let result = split(&extraction.records, &settings.vat);
    print_split(&result);
    for (country, eu_country) in suspicious_countries(&result, &settings.vat) {
        println!(
            "{} '{country}' was counted as non-EU but looks like '{eu_country}'. Check the spelling in the export or the VAT table.",
            "[?]".yellow().bold()
        );
    }

    let now = chrono::Local::now();
    let year = args.year.unwrap_or_else(|| now.year());
    let month = args.month.unwrap_or_else(|| now.month());
    let out_dir = PathBuf::from(shellexpand_path(args.output_dir.as_deref().unwrap_or(".")));
    std::fs::create_dir_all(&out_dir)?;

    println!("{}", "# Saving modified sales data:".bold());
    let mut workbook = sales_workbook(&extraction.records, &result)?;
    save_with_retry(
        &mut workbook,
        "sales",
        out_dir.join(settings.files.sales_file(year, month)),
    )?;

    let template_path = PathBuf::from(shellexpand_path(
        args.template.as_deref().unwrap_or(&settings.files.template),
    ));
    match read_workbook(&template_path) {
        Ok(template) => {
            if !template.other_sheets.is_empty() {
                println!(
                    "{} The template has {} more sheet(s) ({}). Only '{}' is copied, values only, without formatting.",
                    "[?]".yellow().bold(),
                    template.other_sheets.len(),
                    template.other_sheets.join(", "),
                    template.name
                );
            }
            let mut workbook = template_workbook(&template, &result.non_eu, &settings.template)?;
            save_with_retry(
                &mut workbook,
                "sales outside the EU using the template",
                out_dir.join(settings.files.template_file(year, month)),
            )?;
        }
        Err(e) => {
            println!(
                "{} {e}. The import file for sales outside the EU was not written.",
                "[‼]".red().bold()
            );
        }
    }

    Ok(())
}

fn print_issues(issues: &[RowIssue]) {
    for issue in issues {
        let mark = if issue.is_error() {
            " X".red().bold()
        } else {
            " ~".yellow()
        };
        println!("{mark} {issue}");
    }
}

fn print_extraction_summary(summary: &ExtractionSummary) {
    println!("{}", "# Extraction results:".bold());
    println!("{} rows have been scanned.", summary.scanned);
    println!(" ├─ {} rows without data skipped.", summary.skipped);
    println!(" └─ {} rows have been parsed.", summary.parsed());
    if summary.invalid > 0 {
        println!("     ├─ {} rows have been saved.", summary.valid);
        println!("     └─ {} rows are invalid!", summary.invalid);
    }
}

fn count_line(title: &str, counts: &CountryCounts) -> String {
    format!(
        "{} sales in {title} countries have been found. {} countries in total:",
        counts.total(),
        counts.countries()
    )
}

fn print_split(result: &SalesSplit) {
    println!("{}", "# Sales summary:".bold());

    println!("{}", count_line("EU", &result.eu_counts));
    if !result.eu.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Country", "Sales", "Without VAT", "VAT", "Total"]);
        for (country, n) in result.eu_counts.by_count_desc() {
            let Some(t) = result.eu.get(country) else {
                continue;
            };
            table.add_row(vec![
                Cell::new(country),
                Cell::new(n),
                Cell::new(money(t.without_vat)),
                Cell::new(money(t.vat)),
                Cell::new(money(t.total)),
            ]);
        }
        let sum = result.eu_totals();
        table.add_row(vec![
            Cell::new("Total".bold()),
            Cell::new(result.eu_counts.total()),
            Cell::new(money(sum.without_vat)),
            Cell::new(money(sum.vat)),
            Cell::new(money(sum.total)),
        ]);
        println!("{table}");
    }

    println!("{}", count_line("not EU", &result.non_eu_counts));
    if !result.non_eu.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Country", "Sales"]);
        for (country, n) in result.non_eu_counts.by_count_desc() {
            table.add_row(vec![Cell::new(country), Cell::new(n)]);
        }
        table.add_row(vec![
            Cell::new("Total".bold()),
            Cell::new(result.non_eu_counts.total()),
        ]);
        println!("{table}");
    }
    println!();
}

/// Save `workbook`, letting the operator retry or pick another file name when
/// the target cannot be written (typically because it is open in Excel).
fn save_with_retry(workbook: &mut Workbook, title: &str, path: PathBuf) -> Result<PathBuf> {
    let mut path = path;
    loop {
        match workbook.save(&path) {
            Ok(()) => {
                println!(
                    "{} Successfully saved {title} into \"{}\"",
                    "[¤]".green(),
                    path.display()
                );
                return Ok(path);
            }
            Err(e) => {
                if !std::io::stdin().is_terminal() {
                    return Err(e.into());
                }
                println!(
                    "{} Failed to save {title}. Close the \"{}\" file if it is open.\n{e}",
                    "[‼]".red().bold(),
                    path.display()
                );
                println!("Press Enter to try again or enter another filename:");
                let mut input = String::new();
                if std::io::stdin().read_line(&mut input)? == 0 {
                    return Err(e.into());
                }
                let chosen = input.trim();
                if !chosen.is_empty() {
                    path = PathBuf::from(shellexpand_path(chosen));
                }
            }
        }
    }
}
