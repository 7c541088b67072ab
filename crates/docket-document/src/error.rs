//! Error types for document parsing

use thiserror::Error;

/// Errors raised by a parser backend.
///
/// These never leave [`crate::LocalDocumentExtractor::extract`]; they are
/// recorded on a failed [`docket_domain::ExtractedDocument`].
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Reading the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No backend handles this extension
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// File content could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Required command-line tool is not installed
    #[error("Required tool not found on PATH: {0}")]
    ToolMissing(String),

    /// Command-line tool exited unsuccessfully
    #[error("{tool} failed: {message}")]
    ToolFailed {
        /// Program name
        tool: String,
        /// Exit status and stderr
        message: String,
    },
}

impl From<zip::result::ZipError> for DocumentError {
    fn from(e: zip::result::ZipError) -> Self {
        DocumentError::Parse(format!("Invalid archive: {}", e))
    }
}

impl From<roxmltree::Error> for DocumentError {
    fn from(e: roxmltree::Error) -> Self {
        DocumentError::Parse(format!("Invalid XML: {}", e))
    }
}
