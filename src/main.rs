use anyhow::Result;
use chrono::Local;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use cnsort::pipeline::{self, Event, Job};
use cnsort::utils::{default_output_path, home_dir, setup_logging, validate_args};
use cnsort::{classify, Args};

fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose)?;

    if !args.classify.is_empty() {
        for domain in &args.classify {
            println!("{}\t{}", classify(domain), domain);
        }
        return Ok(());
    }

    validate_args(&args)?;

    let Some(input) = args.input.clone() else {
        anyhow::bail!("an input file is required");
    };
    let output = match args.output.clone() {
        Some(path) => path,
        None => default_output_path(&home_dir()?, Local::now().date_naive()),
    };
    info!(action = "resolve", component = "cli", input = ?input, output = ?output, "Resolved paths");

    let pb = progress_bar(args.no_progress || args.json);
    let (events, handle) = pipeline::spawn(Job::new(input, output));
    for event in events {
        match event {
            Event::Progress(percent) => pb.set_position(u64::from(percent)),
            Event::Completed(_) => pb.finish_and_clear(),
        }
    }

    let result = handle
        .join()
        .map_err(|_| anyhow::anyhow!("categorization worker panicked"))?;

    match result {
        Ok(summary) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary.render());
            }
            Ok(())
        }
        Err(e) => {
            error!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
