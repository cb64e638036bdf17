use calamine::Data;
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook, Worksheet, XlsxError};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::info;

use crate::batch::Batch;
use crate::bucket::Bucket;
use crate::config::Settings;
use crate::error::{CategorizeError, Result};
use crate::stats::BucketCounts;
use crate::utils::format_number;

/// Row indices per non-empty bucket, canonical bucket order, input order
/// within each bucket.
pub fn partition(labels: &[Bucket]) -> Vec<(Bucket, Vec<usize>)> {
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); Bucket::COUNT];
    for (row, bucket) in labels.iter().enumerate() {
        groups[bucket.index()].push(row);
    }
    Bucket::ALL
        .into_iter()
        .zip(groups)
        .filter(|(_, rows)| !rows.is_empty())
        .collect()
}

/// Writes a cell keeping its input type. Dates and durations are stored as
/// Excel serial numbers with a matching number format.
fn write_cell(
    worksheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    cell: &Data,
    formats: &CellFormats,
) -> std::result::Result<(), XlsxError> {
    match cell {
        Data::Empty => {}
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Data::Float(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        Data::Int(i) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        Data::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Data::DateTime(dt) => {
            let format = if dt.is_duration() {
                &formats.duration
            } else {
                &formats.datetime
            };
            worksheet.write_number_with_format(row, col, dt.as_f64(), format)?;
        }
        Data::Error(e) => {
            worksheet.write_string(row, col, e.to_string())?;
        }
    }
    Ok(())
}

struct CellFormats {
    datetime: Format,
    duration: Format,
}

impl CellFormats {
    fn new() -> Self {
        Self {
            datetime: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
            duration: Format::new().set_num_format("[h]:mm:ss"),
        }
    }
}

fn build_workbook(batch: &Batch, settings: &Settings) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let formats = CellFormats::new();
    let bucket_col =
        ColNum::try_from(batch.table.headers.len()).map_err(|_| XlsxError::RowColumnLimitError)?;

    for (bucket, rows) in partition(&batch.labels) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(bucket.sheet_name(settings.sheet_name_max))?;

        for (col, header) in batch.table.headers.iter().enumerate() {
            worksheet.write_string(0, col as ColNum, header)?;
        }
        worksheet.write_string(0, bucket_col, &settings.bucket_column)?;

        for (offset, &row) in rows.iter().enumerate() {
            let excel_row =
                RowNum::try_from(offset + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            // header width bounds every column index, see bucket_col
            let width = batch.table.headers.len();
            for (col, cell) in batch.table.rows[row].iter().take(width).enumerate() {
                write_cell(worksheet, excel_row, col as ColNum, cell, &formats)?;
            }
            worksheet.write_string(excel_row, bucket_col, bucket.label())?;
        }
    }

    Ok(workbook)
}

/// Writes one sheet per non-empty bucket to `dest`. The workbook is staged in
/// a temporary file beside `dest` and renamed into place.
pub fn write_workbook(batch: &Batch, dest: &Path, settings: &Settings) -> Result<()> {
    let start_time = Instant::now();
    info!(action = "start", component = "report_writer", destination = ?dest, "Writing workbook");

    let mut workbook = build_workbook(batch, settings)?;
    let buffer = workbook.save_to_buffer()?;

    let write_error = |source| CategorizeError::Write {
        path: dest.to_path_buf(),
        source,
    };
    let dir = dest
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staged = NamedTempFile::new_in(dir).map_err(write_error)?;
    staged.write_all(&buffer).map_err(write_error)?;
    staged.as_file().sync_all().map_err(write_error)?;
    staged.persist(dest).map_err(|e| write_error(e.error))?;

    info!(
        action = "complete",
        component = "report_writer",
        sheet_count = batch.counts.non_empty().count(),
        bytes = buffer.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Workbook written"
    );
    Ok(())
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub output: PathBuf,
    pub total: usize,
    pub buckets: BucketCounts,
}

impl Summary {
    pub fn new(output: PathBuf, counts: BucketCounts) -> Self {
        Self {
            output,
            total: counts.total(),
            buckets: counts,
        }
    }

    /// Human readable summary with thousands separators.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Workbook saved to:\n{}\n", self.output.display()),
            format!("Total processed: {}\n", format_number(self.total)),
        ];
        let breakdown: Vec<String> = self
            .buckets
            .non_empty()
            .map(|(bucket, count)| format!("{:<22} {}", bucket.label(), format_number(count)))
            .collect();
        if !breakdown.is_empty() {
            lines.push(format!("Break-down\n{}", "─".repeat(10)));
            lines.extend(breakdown);
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_keeps_row_order_and_skips_empty_buckets() {
        let labels = [
            Bucket::Unclassified,
            Bucket::AsciiCn,
            Bucket::Unclassified,
            Bucket::IdnIdn,
            Bucket::AsciiCn,
        ];
        let groups = partition(&labels);
        assert_eq!(
            groups,
            vec![
                (Bucket::IdnIdn, vec![3]),
                (Bucket::AsciiCn, vec![1, 4]),
                (Bucket::Unclassified, vec![0, 2]),
            ]
        );
    }

    #[test]
    fn partition_of_nothing_is_empty() {
        assert!(partition(&[]).is_empty());
    }

    #[test]
    fn renders_breakdown_in_canonical_order() {
        let mut counts = BucketCounts::default();
        for _ in 0..1200 {
            counts.record(Bucket::Unclassified);
        }
        counts.record(Bucket::ComCn);

        let text = Summary::new(PathBuf::from("out.xlsx"), counts).render();
        let expected = [
            "Workbook saved to:".to_string(),
            "out.xlsx".to_string(),
            String::new(),
            "Total processed: 1,201".to_string(),
            String::new(),
            "Break-down".to_string(),
            "─".repeat(10),
            format!("{:<22} 1", ".COM.CN"),
            format!("{:<22} 1,200", "UNCLASSIFIED"),
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn summary_serializes_counts() {
        let counts: BucketCounts = [Bucket::AsciiCn, Bucket::AsciiCn].into_iter().collect();
        let summary = Summary::new(PathBuf::from("out.xlsx"), counts);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["buckets"]["ASCII.CN"], 2);
        assert_eq!(json["output"], "out.xlsx");
    }
}
