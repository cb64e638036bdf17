use calamine::{open_workbook_auto, Data, Reader};
use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::error::{CategorizeError, Result};

/// Header row plus data rows. Spreadsheet cells keep their calamine type;
/// CSV cells are all `Data::String`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

impl Table {
    /// Builds a table, padding short rows with empty cells.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Data>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, Data::Empty);
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Index of the first column whose header equals `name` exactly.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Spreadsheet,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("csv") => Some(Self::Csv),
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// Text of a cell as used for classification; empty cells give "".
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn read_table(path: &Path) -> Result<Table> {
    let start_time = Instant::now();
    let format = InputFormat::from_path(path).ok_or_else(|| CategorizeError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    info!(action = "start", component = "table_reader", file_path = ?path, format = ?format, "Reading input table");

    let table = match format {
        InputFormat::Csv => read_csv(path)?,
        InputFormat::Spreadsheet => read_spreadsheet(path)?,
    };

    info!(
        action = "complete",
        component = "table_reader",
        column_count = table.headers.len(),
        row_count = table.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Input table loaded"
    );
    Ok(table)
}

fn read_csv(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|source| CategorizeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv(file, path)
}

/// Parses comma-separated text whose first record is the header. Records
/// shorter than the header are padded; wider ones are rejected.
pub fn parse_csv<R: io::Read>(reader: R, path: &Path) -> Result<Table> {
    let csv_error = |source| CategorizeError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .enumerate()
        .map(|(i, header)| {
            if i == 0 {
                header.trim_start_matches('\u{feff}').to_string()
            } else {
                header.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.len() > headers.len() {
            return Err(CategorizeError::WideRecord {
                path: path.to_path_buf(),
                line: record.position().map_or(0, |pos| pos.line()),
                expected: headers.len(),
                found: record.len(),
            });
        }
        rows.push(record.iter().map(|field| Data::String(field.to_string())).collect());
    }

    Ok(Table::new(headers, rows))
}

fn read_spreadsheet(path: &Path) -> Result<Table> {
    let workbook_error = |source| CategorizeError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CategorizeError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?
        .map_err(workbook_error)?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|row| row.iter().map(cell_text).collect())
        .unwrap_or_default();
    Ok(Table::new(headers, rows.map(<[Data]>::to_vec).collect()))
}
