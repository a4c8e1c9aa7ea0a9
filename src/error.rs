use thiserror::Error;

/// Errors surfaced by the analyzer.
///
/// Broken JSON-LD blocks and unparseable suggestion replies never show up
/// here; they are recovered where they happen.
#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed url `{url}`: {reason}")]
    MalformedUrl { url: String, reason: String },

    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("{service} service answered with status {status}")]
    UpstreamStatus {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("no results: {0}")]
    NoResults(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn fetch(url: &str, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
