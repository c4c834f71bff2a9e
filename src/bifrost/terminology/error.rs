use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while the
/// terminology tables are loaded, merged, or exported.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a workbook has no usable first sheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the primary terminology table does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the properties file does not exist.
    #[error("configuration file not found: {0}")]
    MissingConfig(PathBuf),

    /// Raised when a required key is absent from the properties file.
    #[error("configuration file {path} has no '{key}' property")]
    MissingProperty { path: PathBuf, key: String },

    /// Raised when a properties line cannot be parsed.
    #[error("{path}:{line}: {message}")]
    InvalidProperty {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
