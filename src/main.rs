use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Result, Context};
use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;

use lora_sorter::{report, ScanOptions, Scanner};

/// Classify .safetensors files by their network module and optionally sort them
#[derive(Parser, Debug)]
#[command(name = "lora_sorter", version)]
struct Cli {
    /// Folder to scan (defaults to the current directory)
    folder: Option<PathBuf>,

    /// Move each file into a subdirectory of FOLDER named after its module
    #[arg(long)]
    sort: bool,

    /// Print the full scan result as JSON
    #[arg(long, conflicts_with = "summary")]
    json: bool,

    /// Print scan counters after the listing
    #[arg(long)]
    summary: bool,

    /// Never show a progress bar
    #[arg(long)]
    no_progress: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn level(&self) -> LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Error,
            (false, 0) => LevelFilter::Info,
            (false, 1) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        }
    }

    fn scan_options(&self) -> Result<ScanOptions> {
        let root = match &self.folder {
            Some(folder) => folder.clone(),
            None => std::env::current_dir().context("Failed to determine the current directory")?,
        };
        Ok(ScanOptions {
            show_progress: !self.no_progress,
            ..ScanOptions::new(root).with_sort(self.sort)
        })
    }
}

fn init_logger(level: LevelFilter) {
    if std::env::var("RUST_LOG").is_ok() {
        env_logger::init();
    } else {
        Builder::new()
            .target(Target::Stderr)
            .filter_level(level)
            .format_timestamp(None)
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.level());

    let result = Scanner::new(cli.scan_options()?).scan()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.json {
        report::write_json(&mut out, &result)?;
    } else {
        report::write_listing(&mut out, &result.mapping)?;
        if cli.summary {
            report::write_summary(&mut out, &result.stats)?;
        }
    }
    out.flush()?;
    Ok(())
}
