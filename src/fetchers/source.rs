use std::path::PathBuf;
use std::time::Duration;

/// Where the HTML of a page comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// A previously downloaded HTML file
    Cached(PathBuf),

    /// A live fetch of the rendered page, bounded by `timeout`
    Live { url: String, timeout: Duration },
}

impl ContentSource {
    /// Sources to try in order: the cached file (if any), then a live fetch
    pub fn plan(url: &str, cached: Option<PathBuf>, timeout: Duration) -> Vec<ContentSource> {
        let mut sources = Vec::with_capacity(2);
        if let Some(path) = cached {
            sources.push(ContentSource::Cached(path));
        }
        sources.push(ContentSource::Live {
            url: url.to_string(),
            timeout,
        });
        sources
    }

    /// Short label for logs
    pub fn describe(&self) -> String {
        match self {
            ContentSource::Cached(path) => format!("cached file {}", path.display()),
            ContentSource::Live { url, .. } => format!("live fetch of {}", url),
        }
    }
}
