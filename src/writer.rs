use rust_xlsxwriter::{Color, Format, FormatAlign, Formula, Workbook, Worksheet};

use crate::columns::{col_to_ind, ind_to_col};
use crate::error::{Result, SalesError};
use crate::models::{CellValue, SaleRecord};
use crate::settings::{TemplateLayout, TemplateValue};
use crate::source::SheetRows;
use crate::splitter::SalesSplit;

const SALE_HEADERS: [&str; 3] = ["Date", "Country", "Total"];
const EU_HEADERS: [&str; 4] = ["Country", "Total without VAT", "VAT", "Total"];

fn col_num(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| SalesError::InvalidColumn(ind_to_col(index)))
}

fn row_num(index: usize) -> Result<u32> {
    u32::try_from(index).map_err(|_| SalesError::Other(format!("Row {} is out of range", index + 1)))
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<()> {
    match value {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            sheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            sheet.write_number(row, col, *n)?;
        }
    }
    Ok(())
}

fn sale_row(sale: &SaleRecord) -> Vec<CellValue> {
    vec![
        CellValue::Text(sale.date.clone()),
        CellValue::Text(sale.country.clone()),
        CellValue::Number(sale.total),
    ]
}

// ---------------------------------------------------------------------------
// Sales summary workbook
// ---------------------------------------------------------------------------

/// Lay out one table: a bold header row, the data rows, and to the right a
/// block of "{header}:" labels each paired with a SUM over that column.
/// Summing starts at the 1-based header position `sum_from`.
fn write_table(
    sheet: &mut Worksheet,
    headers: &[&str],
    rows: &[Vec<CellValue>],
    sum_from: usize,
) -> Result<()> {
    let header_format = Format::new().set_bold().set_align(FormatAlign::Center);
    let label_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_font_color(Color::RGB(0xFF0000));
    let sum_format = Format::new().set_font_color(Color::RGB(0xC00000));

    for (c, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col_num(c)?, *header, &header_format)?;
    }
    for (r, cells) in rows.iter().enumerate() {
        for (c, value) in cells.iter().enumerate() {
            write_cell(sheet, row_num(r + 1)?, col_num(c)?, value)?;
        }
    }

    let label_col = col_num(headers.len() + 1)?;
    let last_row = rows.len() + 1;
    let mut widest = 0;
    for (offset, (c, header)) in headers.iter().enumerate().skip(sum_from - 1).enumerate() {
        let label = format!("{header}:");
        let letter = ind_to_col(c);
        let formula = Formula::new(format!("=SUM({letter}2:{letter}{last_row})"));
        let row = row_num(offset + 1)?;
        sheet.write_string_with_format(row, label_col, &label, &label_format)?;
        sheet.write_formula_with_format(row, label_col + 1, formula, &sum_format)?;
        widest = widest.max(label.chars().count());
    }
    if widest > 8 {
        sheet.set_column_width(label_col, widest as f64 + 2.0)?;
    }
    Ok(())
}

/// Build the "Visi" / "ES" / "ne ES" workbook.
pub fn sales_workbook(records: &[SaleRecord], split: &SalesSplit) -> Result<Workbook> {
    let mut workbook = Workbook::new();

    let mut all = Worksheet::new();
    all.set_name("Visi")?;
    let rows: Vec<_> = records.iter().map(sale_row).collect();
    write_table(&mut all, &SALE_HEADERS, &rows, 3)?;
    workbook.push_worksheet(all);

    let mut eu = Worksheet::new();
    eu.set_name("ES")?;
    let rows: Vec<_> = split
        .eu
        .iter()
        .map(|(country, t)| {
            vec![
                CellValue::Text(country.clone()),
                CellValue::Number(t.without_vat),
                CellValue::Number(t.vat),
                CellValue::Number(t.total),
            ]
        })
        .collect();
    write_table(&mut eu, &EU_HEADERS, &rows, 2)?;
    workbook.push_worksheet(eu);

    let mut non_eu = Worksheet::new();
    non_eu.set_name("ne ES")?;
    let rows: Vec<_> = split.non_eu.iter().map(sale_row).collect();
    write_table(&mut non_eu, &SALE_HEADERS, &rows, 3)?;
    workbook.push_worksheet(non_eu);

    Ok(workbook)
}

// ---------------------------------------------------------------------------
// Import template
// ---------------------------------------------------------------------------

/// Copy `template` into a new workbook and fill one row per non-EU sale,
/// starting right under the template's header row.
pub fn template_workbook(
    template: &SheetRows,
    sales: &[SaleRecord],
    layout: &TemplateLayout,
) -> Result<Workbook> {
    let vars = &layout.variables;
    let date_col = col_num(col_to_ind(&vars.date, 0)?)?;
    let number_col = col_num(col_to_ind(&vars.number, 0)?)?;
    let country_col = col_num(col_to_ind(&vars.country, 0)?)?;
    let price_col = col_num(col_to_ind(&vars.price, 0)?)?;
    let constants = layout
        .constants
        .iter()
        .map(|(label, value)| -> Result<(u16, &TemplateValue)> {
            Ok((col_num(col_to_ind(label, 0)?)?, value))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut sheet = Worksheet::new();
    if !template.name.is_empty() {
        sheet.set_name(&template.name)?;
    }
    for (row, col, value) in template.cells() {
        write_cell(&mut sheet, row_num(row - 1)?, col_num(col)?, value)?;
    }

    for (i, sale) in sales.iter().enumerate() {
        let number = i + 1;
        let row = row_num(number)?;
        sheet.write_string(row, date_col, &sale.date)?;
        sheet.write_number(row, number_col, number as f64)?;
        sheet.write_string(row, country_col, &sale.country)?;
        sheet.write_number(row, price_col, sale.total)?;
        for (col, value) in &constants {
            match value {
                TemplateValue::Text(s) => sheet.write_string(row, *col, s)?,
                TemplateValue::Number(n) => sheet.write_number(row, *col, *n)?,
            };
        }
    }

    let mut workbook = Workbook::new();
    workbook.push_worksheet(sheet);
    Ok(workbook)
}
