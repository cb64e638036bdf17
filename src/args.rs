use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cnsort",
    about = "Sort a spreadsheet of domain names into .CN / IDN buckets",
    version,
    long_about = None
)]
pub struct Args {
    /// Spreadsheet (.csv, .xlsx, .xls, ...) with a 'Domain Name' column
    #[arg(required_unless_present = "classify")]
    pub input: Option<PathBuf>,

    /// Output workbook; defaults to sorted_CN_domains_<date>.xlsx in ~/Downloads
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the bucket of each given domain and exit
    #[arg(long, num_args = 1.., value_name = "DOMAIN", conflicts_with_all = ["input", "output"])]
    pub classify: Vec<String>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
