pub mod args;
pub mod batch;
pub mod bucket;
pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod table;
pub mod utils;

pub use args::Args;
pub use batch::{process, Batch};
pub use bucket::Bucket;
pub use config::Settings;
pub use domain::classify;
pub use error::{CategorizeError, ErrorKind};
pub use pipeline::{run, Completion, Job, Observer};
pub use report::Summary;
pub use stats::BucketCounts;
pub use table::{read_table, Table};
