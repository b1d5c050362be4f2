//! BOOK LISTING SCRAPER
//! Walks a paginated book listing one page at a time, pulls title, author,
//! average rating and rating count out of every row it can read, and writes
//! the lot to a single CSV file.

pub mod config;
mod error;
pub mod logging;
#[doc(hidden)]
pub mod macros;
pub mod parse;
pub mod process;
pub mod record;
pub mod request;
pub mod throttle;

pub use config::{Backoff, Config, PersistMode};
pub use error::{Error, Result};
pub use process::{process_site, Collector, PageOutcome};
pub use record::{BookRecord, Dataset};
pub use request::{Fetcher, HttpFetcher};

/// `{page}` is replaced with the 1-based page index.
const URL_TEMPLATE: &str = "https://www.goodreads.com/list/show/1.Best_Books_Ever?page={page}";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0 Safari/537.36";
const FILE_PATH: &str = "data/goodreads_books_scraped.csv";
const PAGE_COUNT: usize = 100;
const PAGE_DELAY_MS: u64 = 2_000;
/// A listing page holds about 100 entries.
const EXPECTED_ROWS_PER_PAGE: usize = 100;
