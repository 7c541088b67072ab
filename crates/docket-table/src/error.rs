//! Error types for table export

use thiserror::Error;

/// Errors raised inside the table layer.
///
/// None of these escape [`crate::export`]; they are logged and replaced by a
/// fallback table.
#[derive(Error, Debug)]
pub enum TableError {
    /// Table violates the five-column contract
    #[error("Invalid table: {0}")]
    Invalid(String),

    /// CSV writer failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serializer failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet writer failure
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// Export format name not recognised
    #[error("Unsupported export format: {0}")]
    UnknownFormat(String),
}

impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for TableError {
    fn from(e: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self {
        TableError::Csv(csv::Error::from(e.into_error()))
    }
}
