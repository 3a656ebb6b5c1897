use std::path::Path;

use calamine::{Data, Reader};

use crate::columns::{Column, SalesColumns};
use crate::error::{Result, SalesError};
use crate::extractor::ColumnHeaders;
use crate::models::CellValue;

/// The used cells of one worksheet, addressed by 1-based spreadsheet row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRows {
    pub name: String,
    /// Names of the workbook's sheets that were not read.
    pub other_sheets: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl SheetRows {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            other_sheets: Vec::new(),
            rows,
        }
    }

    /// Number of the last row holding any cell.
    pub fn last_row(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        row.checked_sub(1)
            .and_then(|r| self.rows.get(r))
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Rows from `start` (1-based) to the end of the sheet.
    pub fn rows_from(&self, start: usize) -> impl Iterator<Item = &[CellValue]> {
        self.rows
            .iter()
            .skip(start.saturating_sub(1))
            .map(Vec::as_slice)
    }

    /// Every non-empty cell as `(row, col, value)`, rows 1-based and columns zero-based.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &CellValue)> {
        self.rows.iter().enumerate().flat_map(|(r, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, v)| **v != CellValue::Empty)
                .map(move |(c, v)| (r + 1, c, v))
        })
    }

    fn header(&self, column: &Column) -> String {
        match self.get(1, column.index) {
            v if v.is_blank() => column.label.clone(),
            v => v.to_string(),
        }
    }

    /// Header labels from row 1, or the column letters where a header is blank.
    pub fn headers(&self, columns: &SalesColumns) -> ColumnHeaders {
        ColumnHeaders {
            date: self.header(&columns.date),
            country: self.header(&columns.country),
            total: self.header(&columns.total),
        }
    }
}

fn convert(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Read the first worksheet of a spreadsheet file.
pub fn read_workbook(path: &Path) -> Result<SheetRows> {
    let workbook_error = |reason: String| SalesError::Workbook {
        path: path.display().to_string(),
        reason,
    };
    let mut workbook = calamine::open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let mut sheet_names = workbook.sheet_names();
    if sheet_names.is_empty() {
        return Err(SalesError::EmptyWorkbook(path.display().to_string()));
    }
    let name = sheet_names.remove(0);
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| workbook_error(e.to_string()))?;

    // The used range need not start at A1; pad so indexes stay absolute.
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut rows = vec![Vec::new(); first_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; first_col as usize];
        cells.extend(row.iter().map(convert));
        rows.push(cells);
    }
    let mut sheet = SheetRows::new(name, rows);
    sheet.other_sheets = sheet_names;
    Ok(sheet)
}

/// Read a CSV export; every non-empty field becomes a text cell. Bytes that
/// are not UTF-8 are replaced rather than failing the whole file.
pub fn read_csv(path: &Path) -> Result<SheetRows> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        rows.push(
            record
                .iter()
                .map(|field| CellValue::from(String::from_utf8_lossy(field).as_ref()))
                .collect(),
        );
    }
    let name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("Sheet1")
        .to_string();
    Ok(SheetRows::new(name, rows))
}

/// Open a sales export, choosing the reader from the file extension.
pub fn open_sheet(path: &Path) -> Result<SheetRows> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let sheet = match ext.as_str() {
        "csv" => read_csv(path)?,
        "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "ods" => read_workbook(path)?,
        _ => return Err(SalesError::UnsupportedInput(path.display().to_string())),
    };
    tracing::debug!(sheet = %sheet.name, rows = sheet.last_row(), "opened {}", path.display());
    Ok(sheet)
}
