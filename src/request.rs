use std::future::Future;

use reqwest::Client;
use tracing::debug;

use crate::{Config, Error, Result};

/// Retrieves the raw markup of one listing page.
pub trait Fetcher {
    fn fetch(&self, page: usize) -> impl Future<Output = Result<String>> + Send;
}

/// Fetches listing pages over HTTP, posing as a desktop browser.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    // Client uses Arc so we can clone cheaply
    client: Client,
    config: Config,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config: config.clone(),
        })
    }
}

impl Fetcher for HttpFetcher {
    /// Requests a page and returns the body as text. Non-2xx answers are errors
    /// unless the config says to accept any status.
    async fn fetch(&self, page: usize) -> Result<String> {
        let url = self.config.page_url(page);
        debug!(%url, "requesting page");

        let res = self.client.get(&url).send().await?;
        let status = res.status();
        if !status.is_success() && !self.config.accept_any_status {
            return Err(Error::HttpStatus { status, url });
        }
        let html = res.text().await?;
        Ok(html)
    }
}
