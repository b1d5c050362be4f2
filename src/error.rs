use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Server answered {status} for {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Couldn't compile selector: {0}")]
    Selector(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Couldn't initialize logging: {0}")]
    Logging(String),
}

impl Error {
    /// True for failures that only cost one page: the network layer gave up or the
    /// server refused the request.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Error::Reqwest(_) | Error::HttpStatus { .. })
    }
}
