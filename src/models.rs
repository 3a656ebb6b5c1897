use std::fmt;

/// A single spreadsheet cell as seen by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Empty cells, empty strings and zero count as "no data", the way a
    /// spreadsheet export leaves unused cells.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(n) => *n == 0.0,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, "None"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// A validated sale, ready to be split and written.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    pub date: String,
    pub country: String,
    pub total: f64,
}

/// VAT decomposition of one EU country's summed sales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EuTotals {
    pub without_vat: f64,
    pub vat: f64,
    pub total: f64,
}

impl EuTotals {
    /// Split a VAT-inclusive `total` at `rate` percent.
    pub fn from_gross(total: f64, rate: f64) -> Self {
        Self {
            without_vat: total * 100.0 / (100.0 + rate),
            vat: total * rate / (100.0 + rate),
            total,
        }
    }
}
