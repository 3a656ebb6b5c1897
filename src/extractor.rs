use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::columns::{Column, SalesColumns};
use crate::models::{CellValue, SaleRecord};

static MDY_SHORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)/([0-9]+)/([0-9]{2})$").expect("valid date regex"));

/// Normalize `MM/DD/YY` to `20YY-MM-DD`, keeping every part exactly as written.
pub fn normalize_date(raw: &str) -> Option<String> {
    let caps = MDY_SHORT.captures(raw)?;
    Some(format!("20{}-{}-{}", &caps[3], &caps[1], &caps[2]))
}

/// Parse a text total, dropping thousands separators.
pub fn parse_total(raw: &str) -> Option<f64> {
    let value: f64 = raw.replace(',', "").trim().parse().ok()?;
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// Outcomes and diagnostics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Skipped,
    Invalid,
    Valid(SaleRecord),
}

/// One diagnostic line produced while scanning a sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIssue {
    /// All three tracked cells are empty.
    Skipped { row: usize },
    /// A tracked cell is empty on a row that has other data.
    Missing {
        row: usize,
        column: String,
        header: String,
        values: [CellValue; 3],
    },
    /// A tracked cell has a value that cannot be used.
    Malformed {
        row: usize,
        column: String,
        header: String,
        value: CellValue,
    },
    /// A text total was converted to a number.
    Normalized {
        row: usize,
        column: String,
        header: String,
        from: String,
        to: f64,
    },
}

impl RowIssue {
    pub fn row(&self) -> usize {
        match self {
            RowIssue::Skipped { row }
            | RowIssue::Missing { row, .. }
            | RowIssue::Malformed { row, .. }
            | RowIssue::Normalized { row, .. } => *row,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RowIssue::Missing { .. } | RowIssue::Malformed { .. })
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowIssue::Skipped { row } => write!(f, "No data in row {row}. Skipped"),
            RowIssue::Missing {
                row,
                column,
                header,
                values: [d, c, t],
            } => write!(f, "[{column}{row}] No '{header}' in row {row}: ({d}, {c}, {t})"),
            RowIssue::Malformed {
                row,
                column,
                header,
                value,
            } => write!(f, "[{column}{row}] Incorrect '{header}' in row {row}: '{value}'"),
            RowIssue::Normalized {
                row,
                column,
                header,
                from,
                to,
            } => write!(
                f,
                "[{column}{row}] Incorrect '{header}' in row {row}: '{from}'. Changed to '{to}'"
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub scanned: usize,
    pub skipped: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl ExtractionSummary {
    /// Rows that carried data, valid or not.
    pub fn parsed(&self) -> usize {
        self.valid + self.invalid
    }
}

pub struct Extraction {
    pub records: Vec<SaleRecord>,
    pub all_valid: bool,
    pub summary: ExtractionSummary,
    pub issues: Vec<RowIssue>,
}

// ---------------------------------------------------------------------------
// RowExtractor
// ---------------------------------------------------------------------------

/// Header labels shown in diagnostics for the three tracked columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeaders {
    pub date: String,
    pub country: String,
    pub total: String,
}

impl ColumnHeaders {
    /// Fall back to the column letters when the sheet has no header text.
    pub fn from_columns(columns: &SalesColumns) -> Self {
        Self {
            date: columns.date.label.clone(),
            country: columns.country.label.clone(),
            total: columns.total.label.clone(),
        }
    }
}

pub struct RowExtractor {
    columns: SalesColumns,
    headers: ColumnHeaders,
}

static EMPTY: CellValue = CellValue::Empty;

fn cell<'a>(row: &'a [CellValue], column: &Column) -> &'a CellValue {
    row.get(column.index).unwrap_or(&EMPTY)
}

impl RowExtractor {
    pub fn new(columns: SalesColumns, headers: ColumnHeaders) -> Self {
        Self { columns, headers }
    }

    pub fn columns(&self) -> &SalesColumns {
        &self.columns
    }

    pub fn headers(&self) -> &ColumnHeaders {
        &self.headers
    }

    /// Scan `rows`, the first of which is spreadsheet row `start`, up to and
    /// including row `stop` when given. A `stop` of 0 means no bound.
    pub fn run<I, R>(&self, rows: I, start: usize, stop: Option<usize>) -> Extraction
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[CellValue]>,
    {
        let mut records = Vec::new();
        let mut issues = Vec::new();
        let mut summary = ExtractionSummary::default();
        let stop = stop.filter(|&stop| stop > 0);

        for (row_number, row) in (start..).zip(rows) {
            if stop.is_some_and(|stop| row_number > stop) {
                break;
            }
            summary.scanned += 1;
            match self.check_row(row_number, row.as_ref(), &mut issues) {
                ValidationOutcome::Skipped => summary.skipped += 1,
                ValidationOutcome::Invalid => summary.invalid += 1,
                ValidationOutcome::Valid(record) => records.push(record),
            }
        }
        summary.valid = records.len();

        records.sort_by(|a, b| a.date.cmp(&b.date));

        tracing::info!(
            scanned = summary.scanned,
            skipped = summary.skipped,
            valid = summary.valid,
            invalid = summary.invalid,
            "sales extraction finished"
        );

        Extraction {
            records,
            all_valid: summary.invalid == 0,
            summary,
            issues,
        }
    }

    /// Classify one row, pushing every diagnostic it produces onto `issues`.
    pub fn check_row(
        &self,
        row_number: usize,
        row: &[CellValue],
        issues: &mut Vec<RowIssue>,
    ) -> ValidationOutcome {
        let date = cell(row, &self.columns.date);
        let country = cell(row, &self.columns.country);
        let total = cell(row, &self.columns.total);

        if date.is_blank() && country.is_blank() && total.is_blank() {
            tracing::debug!(row = row_number, "blank row skipped");
            issues.push(RowIssue::Skipped { row: row_number });
            return ValidationOutcome::Skipped;
        }

        let before = issues.len();
        let values = [date.clone(), country.clone(), total.clone()];
        let missing = |column: &Column, header: &str| RowIssue::Missing {
            row: row_number,
            column: column.label.clone(),
            header: header.to_string(),
            values: values.clone(),
        };
        let malformed = |column: &Column, header: &str, value: &CellValue| RowIssue::Malformed {
            row: row_number,
            column: column.label.clone(),
            header: header.to_string(),
            value: value.clone(),
        };

        // Sale date: keep the raw value unless it normalizes.
        let mut new_date = date.to_string();
        if date.is_blank() {
            issues.push(missing(&self.columns.date, &self.headers.date));
        } else {
            match date {
                CellValue::Text(raw) => match normalize_date(raw) {
                    Some(normalized) => new_date = normalized,
                    None => issues.push(malformed(&self.columns.date, &self.headers.date, date)),
                },
                _ => issues.push(malformed(&self.columns.date, &self.headers.date, date)),
            }
        }

        // Ship country
        if country.is_blank() {
            issues.push(missing(&self.columns.country, &self.headers.country));
        }

        // Order total
        let mut new_total = 0.0;
        if total.is_blank() {
            issues.push(missing(&self.columns.total, &self.headers.total));
        } else if let CellValue::Number(n) = total {
            new_total = *n;
        } else if let CellValue::Text(raw) = total {
            match parse_total(raw) {
                Some(parsed) => {
                    new_total = parsed;
                    if raw.contains(',') || raw.trim() != raw {
                        issues.push(RowIssue::Normalized {
                            row: row_number,
                            column: self.columns.total.label.clone(),
                            header: self.headers.total.clone(),
                            from: raw.clone(),
                            to: parsed,
                        });
                    }
                }
                None => issues.push(malformed(&self.columns.total, &self.headers.total, total)),
            }
        }

        let errors = issues[before..].iter().filter(|i| i.is_error()).count();
        for issue in &issues[before..] {
            tracing::debug!(row = row_number, "{issue}");
        }
        if errors > 0 {
            return ValidationOutcome::Invalid;
        }

        ValidationOutcome::Valid(SaleRecord {
            date: new_date,
            country: country.to_string(),
            total: new_total,
        })
    }
}

/// Extract validated, date-sorted sales from `rows` (starting at row `start`).
/// Returns the records and whether every row with data was valid.
pub fn extract<I, R>(
    rows: I,
    columns: &SalesColumns,
    start: usize,
    stop: Option<usize>,
) -> (Vec<SaleRecord>, bool)
where
    I: IntoIterator<Item = R>,
    R: AsRef<[CellValue]>,
{
    let extractor = RowExtractor::new(columns.clone(), ColumnHeaders::from_columns(columns));
    let result = extractor.run(rows, start, stop);
    (result.records, result.all_valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> SalesColumns {
        SalesColumns::parse("A", "B", "C").unwrap()
    }

    fn extractor() -> RowExtractor {
        RowExtractor::new(
            columns(),
            ColumnHeaders {
                date: "Sale Date".into(),
                country: "Ship Country".into(),
                total: "Order Total".into(),
            },
        )
    }

    fn row(date: &str, country: &str, total: &str) -> Vec<CellValue> {
        vec![date.into(), country.into(), total.into()]
    }

    #[test]
    fn test_normalize_date_verbatim_parts() {
        assert_eq!(normalize_date("1/15/24"), Some("2024-1-15".to_string()));
        assert_eq!(normalize_date("01/05/23"), Some("2023-01-05".to_string()));
        assert_eq!(normalize_date("13/45/99"), Some("2099-13-45".to_string()));
    }

    #[test]
    fn test_normalize_date_rejects_other_shapes() {
        assert_eq!(normalize_date("2024-01-15"), None);
        assert_eq!(normalize_date("1/15"), None);
        assert_eq!(normalize_date("1/15/24/1"), None);
        assert_eq!(normalize_date("a/15/24"), None);
        assert_eq!(normalize_date("1/15/2024"), None);
        assert_eq!(normalize_date(" 1/15/24"), None);
    }

    #[test]
    fn test_parse_total() {
        assert_eq!(parse_total("100"), Some(100.0));
        assert_eq!(parse_total("1,234.56"), Some(1234.56));
        assert_eq!(parse_total(" 12.5 "), Some(12.5));
        assert_eq!(parse_total("bad"), None);
        assert_eq!(parse_total("NaN"), None);
        assert_eq!(parse_total(""), None);
    }

    #[test]
    fn test_blank_row_is_skipped() {
        let mut issues = Vec::new();
        let outcome = extractor().check_row(3, &row("", "", ""), &mut issues);
        assert_eq!(outcome, ValidationOutcome::Skipped);
        assert_eq!(issues, vec![RowIssue::Skipped { row: 3 }]);
    }

    #[test]
    fn test_short_row_reads_as_empty() {
        let mut issues = Vec::new();
        let outcome = extractor().check_row(7, &[], &mut issues);
        assert_eq!(outcome, ValidationOutcome::Skipped);
    }

    #[test]
    fn test_valid_row_with_numeric_total() {
        let mut issues = Vec::new();
        let cells = vec!["3/1/24".into(), "France".into(), CellValue::Number(20.5)];
        let outcome = extractor().check_row(2, &cells, &mut issues);
        assert_eq!(
            outcome,
            ValidationOutcome::Valid(SaleRecord {
                date: "2024-3-1".into(),
                country: "France".into(),
                total: 20.5,
            })
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_text_total_is_normalized_not_an_error() {
        let mut issues = Vec::new();
        let outcome = extractor().check_row(4, &row("2/1/24", "Canada", "1,050.00"), &mut issues);
        let ValidationOutcome::Valid(record) = outcome else {
            panic!("expected a valid row");
        };
        assert_eq!(record.total, 1050.0);
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
        assert_eq!(
            issues[0].to_string(),
            "[C4] Incorrect 'Order Total' in row 4: '1,050.00'. Changed to '1050'"
        );
    }

    #[test]
    fn test_every_field_error_is_reported() {
        let mut issues = Vec::new();
        let cells = vec!["15.01.2024".into(), CellValue::Empty, "n/a".into()];
        let outcome = extractor().check_row(9, &cells, &mut issues);
        assert_eq!(outcome, ValidationOutcome::Invalid);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.is_error() && i.row() == 9));
        assert_eq!(
            issues[0].to_string(),
            "[A9] Incorrect 'Sale Date' in row 9: '15.01.2024'"
        );
        assert_eq!(
            issues[1].to_string(),
            "[B9] No 'Ship Country' in row 9: (15.01.2024, None, n/a)"
        );
    }

    #[test]
    fn test_numeric_date_is_invalid() {
        let mut issues = Vec::new();
        let cells = vec![CellValue::Number(45307.0), "Spain".into(), CellValue::Number(10.0)];
        assert_eq!(
            extractor().check_row(2, &cells, &mut issues),
            ValidationOutcome::Invalid
        );
    }

    #[test]
    fn test_zero_total_counts_as_missing() {
        let mut issues = Vec::new();
        let cells = vec!["1/2/24".into(), "Spain".into(), CellValue::Number(0.0)];
        assert_eq!(
            extractor().check_row(2, &cells, &mut issues),
            ValidationOutcome::Invalid
        );
        assert!(matches!(issues[0], RowIssue::Missing { ref column, .. } if column == "C"));
    }

    #[test]
    fn test_run_sorts_and_counts() {
        let rows = vec![
            row("3/1/24", "France", "30"),
            row("", "", ""),
            row("1/9/24", "Germany", "10"),
            row("oops", "Germany", "10"),
            row("2/1/24", "Canada", "20"),
            row("13-01-24", "", "n/a"),
        ];
        let result = extractor().run(rows, 2, None);
        let dates: Vec<&str> = result.records.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-1-9", "2024-2-1", "2024-3-1"]);
        assert!(!result.all_valid);
        assert_eq!(
            result.summary,
            ExtractionSummary {
                scanned: 6,
                skipped: 1,
                valid: 3,
                invalid: 2,
            }
        );
        assert_eq!(result.summary.parsed(), 5);
        let error_rows: Vec<usize> = result
            .issues
            .iter()
            .filter(|i| i.is_error())
            .map(|i| i.row())
            .collect();
        assert_eq!(error_rows, vec![5, 7, 7, 7]);
    }

    #[test]
    fn test_plain_text_total_is_silent() {
        let mut issues = Vec::new();
        let outcome = extractor().check_row(3, &row("2/1/24", "Canada", "100"), &mut issues);
        assert!(matches!(outcome, ValidationOutcome::Valid(ref r) if r.total == 100.0));
        assert!(issues.is_empty());

        let outcome = extractor().check_row(3, &row("2/1/24", "Canada", " 7.5"), &mut issues);
        assert!(matches!(outcome, ValidationOutcome::Valid(ref r) if r.total == 7.5));
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn test_run_stop_zero_is_unbounded() {
        let rows = vec![row("1/1/24", "France", "1"), row("bad", "France", "2")];
        let result = extractor().run(rows, 2, Some(0));
        assert_eq!(result.summary.scanned, 2);
        assert_eq!(result.summary.invalid, 1);
        assert!(!result.all_valid);
    }

    #[test]
    fn test_run_stops_inclusively() {
        let rows = vec![
            row("1/1/24", "France", "1"),
            row("1/2/24", "France", "2"),
            row("bad", "", ""),
        ];
        let result = extractor().run(rows, 2, Some(3));
        assert_eq!(result.summary.scanned, 2);
        assert_eq!(result.records.len(), 2);
        assert!(result.all_valid);
    }

    #[test]
    fn test_run_on_no_rows() {
        let result = extractor().run(Vec::<Vec<CellValue>>::new(), 2, None);
        assert!(result.records.is_empty());
        assert!(result.all_valid);
        assert_eq!(result.summary, ExtractionSummary::default());
    }

    #[test]
    fn test_extract_contract() {
        let rows = vec![
            row("1/15/24", "Germany", "100"),
            row("", "", ""),
            row("2/1/24", "Canada", "50,00"),
            row("3/1/24", "France", "bad"),
        ];
        let (records, all_valid) = extract(rows, &columns(), 2, None);
        assert!(!all_valid);
        assert_eq!(
            records,
            vec![
                SaleRecord {
                    date: "2024-1-15".into(),
                    country: "Germany".into(),
                    total: 100.0,
                },
                SaleRecord {
                    date: "2024-2-1".into(),
                    country: "Canada".into(),
                    total: 5000.0,
                },
            ]
        );
    }
}
