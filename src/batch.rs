use calamine::Data;
use std::time::Instant;
use tracing::info;

use crate::bucket::Bucket;
use crate::config::Settings;
use crate::domain::classify;
use crate::error::{CategorizeError, Result};
use crate::stats::BucketCounts;
use crate::table::{cell_text, Table};

/// Point at which progress is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    /// Row index after which the checkpoint fires; equals the row count for
    /// the final one.
    pub row: usize,
    pub percent: u8,
}

/// Lazy progress schedule: one checkpoint every `every` rows starting at row
/// zero, then a final 100%.
#[derive(Debug, Clone)]
pub struct Checkpoints {
    total: usize,
    every: usize,
    next_row: usize,
    finished: bool,
}

impl Checkpoints {
    pub fn new(total: usize, every: usize) -> Self {
        Self {
            total,
            every: every.max(1),
            next_row: 0,
            finished: false,
        }
    }
}

impl Iterator for Checkpoints {
    type Item = Checkpoint;

    fn next(&mut self) -> Option<Checkpoint> {
        if self.finished {
            return None;
        }
        if self.next_row < self.total {
            let row = self.next_row;
            self.next_row = self.next_row.saturating_add(self.every);
            let percent = (row * 100 / self.total) as u8;
            return Some(Checkpoint { row, percent });
        }
        self.finished = true;
        Some(Checkpoint {
            row: self.total,
            percent: 100,
        })
    }
}

/// A classified table: one bucket per row, in row order.
#[derive(Debug, Clone)]
pub struct Batch {
    pub table: Table,
    pub labels: Vec<Bucket>,
    pub counts: BucketCounts,
}

impl Batch {
    /// Rows paired with their bucket.
    pub fn labeled_rows(&self) -> impl Iterator<Item = (&[Data], Bucket)> {
        self.table
            .rows
            .iter()
            .map(Vec::as_slice)
            .zip(self.labels.iter().copied())
    }
}

/// Classifies the domain column of `table`, reporting progress percentages
/// to `on_progress`.
pub fn process(
    table: Table,
    settings: &Settings,
    mut on_progress: impl FnMut(u8),
) -> Result<Batch> {
    let start_time = Instant::now();
    let column = table
        .column(&settings.domain_column)
        .ok_or_else(|| CategorizeError::MissingColumn {
            column: settings.domain_column.clone(),
        })?;

    if table.is_empty() {
        return Err(CategorizeError::NoRows {
            column: settings.domain_column.clone(),
        });
    }

    let total = table.len();
    info!(
        action = "start",
        component = "batch",
        row_count = total,
        column_index = column,
        "Classifying domains"
    );

    let mut checkpoints = Checkpoints::new(total, settings.progress_every).peekable();
    let mut labels = Vec::with_capacity(total);
    let mut counts = BucketCounts::default();

    for (i, row) in table.rows.iter().enumerate() {
        let domain = row.get(column).map(cell_text).unwrap_or_default();
        let bucket = classify(domain.trim());
        labels.push(bucket);
        counts.record(bucket);

        while let Some(checkpoint) = checkpoints.next_if(|c| c.row <= i) {
            on_progress(checkpoint.percent);
        }
    }
    for checkpoint in checkpoints {
        on_progress(checkpoint.percent);
    }

    info!(
        action = "complete",
        component = "batch",
        row_count = counts.total(),
        unclassified = counts.get(Bucket::Unclassified),
        duration_ms = start_time.elapsed().as_millis(),
        "Domain classification completed"
    );

    Ok(Batch {
        table,
        labels,
        counts,
    })
}
