pub mod source;
pub mod web;

pub use source::ContentSource;
pub use web::WebDriverFetcher;

use crate::error::{Error, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Something that can load the rendered HTML of a live page
pub trait FetchPage: Send + Sync {
    /// Fetches `url`, giving up after `timeout`
    fn fetch_live(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Loads HTML from a single source
pub async fn fetch_content<F: FetchPage>(fetcher: &F, source: &ContentSource) -> Result<String> {
    match source {
        ContentSource::Cached(path) => read_cached(path).await,
        ContentSource::Live { url, timeout } => {
            match tokio::time::timeout(*timeout, fetcher.fetch_live(url, *timeout)).await {
                Ok(result) => result,
                Err(_) => {
                    ::log::error!("Live fetch of {} exceeded {:?}", url, timeout);
                    Err(Error::fetch(
                        url,
                        format!("no content within {}ms", timeout.as_millis()),
                    ))
                }
            }
        }
    }
}

/// Reads the cached file when one is given, falling back to a live fetch
/// if it is missing, unreadable or empty
pub async fn fetch_with_fallback<F: FetchPage>(
    fetcher: &F,
    url: &str,
    cached: Option<PathBuf>,
    timeout: Duration,
) -> Result<String> {
    let mut last_error = None;

    for source in ContentSource::plan(url, cached, timeout) {
        ::log::info!("Loading {} via {}", url, source.describe());
        match fetch_content(fetcher, &source).await {
            Ok(html) => return Ok(html),
            Err(e) => {
                ::log::warn!("{} failed: {}", source.describe(), e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::fetch(url, "no content source available")))
}

async fn read_cached(path: &Path) -> Result<String> {
    let location = path.display().to_string();
    let html = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::fetch(&location, e))?;

    if html.trim().is_empty() {
        return Err(Error::fetch(&location, "cached file is empty"));
    }
    Ok(html)
}
