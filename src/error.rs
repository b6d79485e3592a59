use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClasslistError {
    /// No class list document was given; nothing is written.
    #[error("no input document selected")]
    NoInput,

    #[error("input document not found: {0:?}")]
    MissingInput(PathBuf),

    #[error("unsupported input type (expected .pdf or .txt): {0:?}")]
    UnsupportedInput(PathBuf),

    #[error("failed to open PDF {path:?}: {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("sheet {sheet:?} of workbook {path:?} has no column {column:?}")]
    MissingColumn {
        path: PathBuf,
        sheet: String,
        column: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to read workbook: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, ClasslistError>;
