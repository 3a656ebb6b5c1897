use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid column address: '{0}'")]
    InvalidColumn(String),

    #[error("Failed to open \"{path}\": {reason}")]
    Workbook { path: String, reason: String },

    #[error("No worksheet found in \"{0}\"")]
    EmptyWorkbook(String),

    #[error("Unsupported input file: {0} (expected .xlsx, .xlsm, .xls, .xlsb, .ods or .csv)")]
    UnsupportedInput(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SalesError>;
