use bookscrap::{info_time, logging, process::process_site, Config, Result};
use chrono::Local;
use clap::Parser;

/// Scrapes the "Best Books Ever" listing into a CSV file.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Number of listing pages to scrape. Zero or less writes an empty file.
    #[arg(default_value_t = 100, allow_negative_numbers = true)]
    pages: i64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init()?;

    let start_time = Local::now();
    let page_count = usize::try_from(cli.pages.max(0)).unwrap_or(usize::MAX);
    let dataset = process_site(Config::default().with_page_count(page_count)).await?;
    info_time!(start_time, "Collected {} books.", dataset.len());

    Ok(())
}
