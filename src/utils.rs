use anyhow::Context;
use chrono::NaiveDate;
use std::env;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

use crate::table::InputFormat;

pub fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

pub fn format_number(num: usize) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn home_dir() -> anyhow::Result<PathBuf> {
    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("Neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home))
}

/// `sorted_CN_domains_<YYYYMMDD>.xlsx` under `home/Downloads` when that
/// directory exists, else directly under `home`.
pub fn default_output_path(home: &Path, today: NaiveDate) -> PathBuf {
    let name = format!("sorted_CN_domains_{}.xlsx", today.format("%Y%m%d"));
    let downloads = home.join("Downloads");
    if downloads.is_dir() {
        downloads.join(name)
    } else {
        home.join(name)
    }
}

pub fn validate_args(args: &crate::args::Args) -> anyhow::Result<()> {
    if let Some(input) = &args.input {
        if !input.is_file() {
            anyhow::bail!("Select a valid input file: {:?} does not exist", input);
        }
        if InputFormat::from_path(input).is_none() {
            anyhow::bail!(
                "Unsupported input file {:?}: expected .csv, .xlsx, .xlsm, .xlsb, .xls or .ods",
                input
            );
        }
    }

    if let Some(output) = &args.output {
        let is_xlsx = output
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
        if !is_xlsx {
            anyhow::bail!("--output must end in .xlsx: {:?}", output);
        }
    }

    Ok(())
}
