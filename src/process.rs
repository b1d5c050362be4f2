use chrono::Local;
use tracing::{info, warn};

use crate::parse::PageParser;
use crate::throttle::RateLimiter;
use crate::{
    info_time, BookRecord, Config, Dataset, Fetcher, HttpFetcher, PersistMode, Result,
    EXPECTED_ROWS_PER_PAGE, PAGE_COUNT,
};

/// What one page contributed to the run.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOutcome {
    pub page: usize,
    pub rows_found: usize,
    pub records: Vec<BookRecord>,
    /// Rows present in the markup that the extractor couldn't read.
    pub skipped: usize,
    pub fetch_failed: bool,
}

/// Drives a run: pages in order, one at a time, a pause after each, and the
/// dataset written out at the end (or after every page, if configured).
#[derive(Debug)]
pub struct Collector<F> {
    fetcher: F,
    parser: PageParser,
    config: Config,
}

impl<F: Fetcher> Collector<F> {
    pub fn new(fetcher: F, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fetcher,
            parser: PageParser::new()?,
            config,
        })
    }

    /// Fetches and parses a single page. A failed fetch is logged and comes back
    /// as a page with no records.
    pub async fn scrape_page(&self, page: usize) -> PageOutcome {
        let html = match self.fetcher.fetch(page).await {
            Ok(html) => html,
            Err(err) => {
                warn!(page, error = %err, "couldn't fetch page, skipping it");
                return PageOutcome {
                    page,
                    rows_found: 0,
                    records: Vec::new(),
                    skipped: 0,
                    fetch_failed: true,
                };
            }
        };

        let parsed = self.parser.parse(&html);
        info_time!("Found {} books on page {}", parsed.rows_found, page);
        PageOutcome {
            page,
            rows_found: parsed.rows_found,
            records: parsed.records,
            skipped: parsed.skipped,
            fetch_failed: false,
        }
    }

    /// Scrapes pages `1..=page_count` and writes everything collected to the
    /// configured output path. Page failures only shrink the dataset; a failed
    /// write is the one error that ends the run.
    pub async fn collect(&self, page_count: usize) -> Result<Dataset> {
        let start_time = Local::now();
        let output_path = &self.config.output_path;
        let mut limiter = RateLimiter::from_config(&self.config);
        let mut dataset =
            Dataset::with_capacity(page_count.min(PAGE_COUNT) * EXPECTED_ROWS_PER_PAGE);
        let mut failed_pages = 0;
        let mut skipped_rows = 0;

        info_time!("Started scraping {} pages", page_count);
        for page in 1..=page_count {
            info_time!("Scraping page {} of {}...", page, page_count);
            let outcome = self.scrape_page(page).await;
            if outcome.fetch_failed {
                failed_pages += 1;
            }
            skipped_rows += outcome.skipped;
            dataset.extend(outcome.records);

            if self.config.persist == PersistMode::EveryPage {
                dataset.write_csv(output_path)?;
            }

            limiter.pause(outcome.fetch_failed).await;
        }

        if self.config.persist.final_write_needed(page_count) {
            dataset.write_csv(output_path)?;
        }
        info!(
            pages = page_count,
            failed_pages,
            skipped_rows,
            records = dataset.len(),
            "run finished"
        );
        info_time!(
            start_time,
            "Scraping complete. Data saved to: {}",
            output_path.display()
        );

        Ok(dataset)
    }
}

/// Scrapes the configured listing over HTTP.
pub async fn process_site(config: Config) -> Result<Dataset> {
    let page_count = config.page_count;
    let fetcher = HttpFetcher::new(&config)?;
    let collector = Collector::new(fetcher, config)?;
    collector.collect(page_count).await
}
