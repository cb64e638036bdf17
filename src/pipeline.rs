use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{error, info};

use crate::batch::process;
use crate::config::Settings;
use crate::error::{CategorizeError, Result};
use crate::report::{write_workbook, Summary};
use crate::table::read_table;

#[derive(Debug, Clone)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    pub settings: Settings,
}

impl Job {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            settings: Settings::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }
}

/// Terminal signal of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub output: PathBuf,
    /// Empty on success.
    pub error: String,
    /// Bucket label to count plus `TOTAL`; empty on failure.
    pub counts: BTreeMap<String, usize>,
}

impl Completion {
    fn from_result(output: &std::path::Path, result: &Result<Summary>) -> Self {
        match result {
            Ok(summary) => Self {
                output: output.to_path_buf(),
                error: String::new(),
                counts: summary.buckets.to_map(),
            },
            Err(e) => Self {
                output: output.to_path_buf(),
                error: e.to_string(),
                counts: BTreeMap::new(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }
}

pub trait Observer {
    fn progress(&mut self, percent: u8);
    fn completed(&mut self, completion: &Completion);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Progress(u8),
    Completed(Completion),
}

struct ChannelObserver(Sender<Event>);

impl Observer for ChannelObserver {
    fn progress(&mut self, percent: u8) {
        // receiver gone means nobody is listening any more
        let _ = self.0.send(Event::Progress(percent));
    }

    fn completed(&mut self, completion: &Completion) {
        let _ = self.0.send(Event::Completed(completion.clone()));
    }
}

/// Runs `job` on the calling thread.
pub fn run(job: &Job, observer: &mut impl Observer) -> Result<Summary> {
    let start_time = Instant::now();
    info!(action = "start", component = "pipeline", input = ?job.input, output = ?job.output, "Starting domain categorization");

    let result = execute(job, observer);
    match &result {
        Ok(summary) => info!(
            action = "complete",
            component = "pipeline",
            total = summary.total,
            duration_ms = start_time.elapsed().as_millis(),
            "Categorization completed"
        ),
        Err(e) => error!(action = "fail", component = "pipeline", kind = %e.kind(), error = %e, "Categorization failed"),
    }

    observer.completed(&Completion::from_result(&job.output, &result));
    result
}

fn execute(job: &Job, observer: &mut impl Observer) -> Result<Summary> {
    let table = read_table(&job.input)?;
    let batch = process(table, &job.settings, |percent| observer.progress(percent))?;
    write_workbook(&batch, &job.output, &job.settings)?;
    Ok(Summary::new(job.output.clone(), batch.counts))
}

/// Runs `job` on a worker thread, streaming events until the completion.
pub fn spawn(job: Job) -> (Receiver<Event>, JoinHandle<std::result::Result<Summary, CategorizeError>>) {
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let mut observer = ChannelObserver(tx);
        run(&job, &mut observer)
    });
    (rx, handle)
}
