//! Command-line interface for the crawler.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{validate_limits, CrawlerConfig};
use crate::crawl::{CrawlReport, Crawler, StopReason};
use crate::error::Result;

/// DocLens crawler - Download business documents from an open-data catalog.
#[derive(Parser)]
#[command(name = "doclens-crawler")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl the catalog listing and download new documents.
    Crawl {
        /// Stop after this many new files
        #[arg(long, default_value_t = 10)]
        max_files: usize,

        /// Visit at most this many listing pages
        #[arg(long, default_value_t = 20)]
        max_pages: u32,

        /// Content store directory (default: data/raw)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Audit log CSV (default: data/crawl_log.csv)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            max_files,
            max_pages,
            output,
            log_file,
        } => crawl_command(max_files, max_pages, output, log_file),
    }
}

fn crawl_command(
    max_files: usize,
    max_pages: u32,
    output: Option<PathBuf>,
    log_file: Option<PathBuf>,
) -> Result<()> {
    validate_limits(max_files, max_pages)?;

    let mut config = CrawlerConfig::default();
    if let Some(dir) = output {
        config = config.with_content_dir(dir);
    }
    if let Some(path) = log_file {
        config = config.with_audit_log(path);
    }

    println!(
        "{} up to {} files from {} pages",
        style("Crawling").bold(),
        style(max_files).cyan(),
        style(max_pages).cyan()
    );
    println!();

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Crawling catalog...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let crawler = Crawler::new(config)?;
    let report = match crawler.crawl(max_files, max_pages) {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();
    print_report(&report, &crawler.store().root().display().to_string());
    Ok(())
}

fn print_report(report: &CrawlReport, output_dir: &str) {
    for filename in &report.downloaded {
        println!("  {} {}", style("saved").green(), filename);
    }
    if !report.skipped.is_empty() {
        println!("  Skipped: {}", style(report.skipped.len()).yellow());
    }
    if !report.failures.is_empty() {
        println!("  Failures: {}", style(report.failures.len()).yellow().bold());
    }

    let reason = match report.stop_reason {
        StopReason::MaxFilesReached => "file limit reached".to_string(),
        StopReason::EmptyListing { page } => format!("page {page} listed no datasets"),
        StopReason::PagesExhausted => "page limit reached".to_string(),
    };

    println!();
    println!(
        "{} {} files into {} ({})",
        style("Downloaded").green().bold(),
        report.downloaded.len(),
        output_dir,
        reason
    );
}
