use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result, FILE_PATH, PAGE_COUNT, PAGE_DELAY_MS, URL_TEMPLATE, USER_AGENT};

/// Placeholder in [`Config::url_template`] that receives the page index.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// When the collected rows are written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistMode {
    /// Write once, after the last page. An interrupted run loses everything.
    #[default]
    AtEnd,
    /// Rewrite the whole file after every page.
    EveryPage,
}

impl PersistMode {
    /// Whether the file still has to be written once the last page is done.
    /// `EveryPage` has already written it unless there were no pages at all.
    pub fn final_write_needed(self, page_count: usize) -> bool {
        match self {
            PersistMode::AtEnd => true,
            PersistMode::EveryPage => page_count == 0,
        }
    }
}

/// Exponential growth of the inter-page delay while pages keep failing to fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub factor: f64,
    pub max_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            factor: 2.0,
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Everything a run needs to know about where to go and how fast.
#[derive(Debug, Clone)]
pub struct Config {
    pub url_template: String,
    pub user_agent: String,
    pub output_path: PathBuf,
    pub page_count: usize,
    pub delay: Duration,
    pub backoff: Option<Backoff>,
    pub persist: PersistMode,
    /// Parse bodies of non-2xx responses instead of treating them as fetch failures.
    pub accept_any_status: bool,
    /// `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url_template: URL_TEMPLATE.to_string(),
            user_agent: USER_AGENT.to_string(),
            output_path: PathBuf::from(FILE_PATH),
            page_count: PAGE_COUNT,
            delay: Duration::from_millis(PAGE_DELAY_MS),
            backoff: None,
            persist: PersistMode::AtEnd,
            accept_any_status: false,
            timeout: None,
        }
    }
}

impl Config {
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_page_count(mut self, page_count: usize) -> Self {
        self.page_count = page_count;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = Some(backoff);
        self
    }

    pub fn with_persist(mut self, persist: PersistMode) -> Self {
        self.persist = persist;
        self
    }

    pub fn with_accept_any_status(mut self, accept: bool) -> Self {
        self.accept_any_status = accept;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the address of one listing page.
    pub fn page_url(&self, page: usize) -> String {
        self.url_template.replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.url_template.contains(PAGE_PLACEHOLDER) {
            return Err(Error::Config(format!(
                "url template `{}` has no {PAGE_PLACEHOLDER} placeholder",
                self.url_template
            )));
        }
        if let Some(backoff) = self.backoff {
            if backoff.factor.is_nan() || backoff.factor < 1.0 {
                return Err(Error::Config(format!(
                    "backoff factor must be at least 1, got {}",
                    backoff.factor
                )));
            }
        }
        Ok(())
    }
}
