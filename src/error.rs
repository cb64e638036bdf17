use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse grouping of [`CategorizeError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Schema,
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Schema => "schema",
            ErrorKind::Io => "io",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum CategorizeError {
    #[error("Input must contain a '{column}' column.")]
    MissingColumn { column: String },

    #[error(
        "Unsupported input format for {}: expected .csv, .xlsx, .xlsm, .xlsb, .xls or .ods",
        .path.display()
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error(
        "Failed to parse CSV {}: record on line {line} has {found} fields, header has {expected}",
        .path.display()
    )]
    WideRecord {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Failed to open workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Workbook {} has no worksheets", .path.display())]
    EmptyWorkbook { path: PathBuf },

    #[error("Input has no rows under the '{column}' column")]
    NoRows { column: String },

    #[error("Failed to build workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CategorizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CategorizeError::MissingColumn { .. } => ErrorKind::Schema,
            CategorizeError::UnsupportedFormat { .. }
            | CategorizeError::Read { .. }
            | CategorizeError::Csv { .. }
            | CategorizeError::WideRecord { .. }
            | CategorizeError::Workbook { .. }
            | CategorizeError::EmptyWorkbook { .. }
            | CategorizeError::NoRows { .. }
            | CategorizeError::Xlsx(_)
            | CategorizeError::Write { .. } => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, CategorizeError>;
