use crate::error::{Error, Result};
use crate::filter::LinkFilterConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Configuration for fetching, scoring and the delegated services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// URL for the WebDriver instance used for live fetches
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Upper bound for a live fetch to settle, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum number of URLs scored at the same time in a batch
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Number of reports kept after ranking a batch
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,

    /// Number of links requested from the search service when none is given
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Crawl service endpoint (answers with `reports`)
    #[serde(default = "default_crawl_endpoint")]
    pub crawl_endpoint: String,

    /// Search service endpoint (answers with `links`)
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,

    /// Text generation endpoint used for suggestion reports
    #[serde(default = "default_llm_endpoint")]
    pub llm_endpoint: String,

    /// Model name sent to the text generation endpoint
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    /// Language the suggestion report should be written in
    #[serde(default = "default_suggestion_language")]
    pub suggestion_language: String,

    /// Request timeout for the delegated services, in seconds
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// Cleanup applied to link lists before they are scored
    #[serde(default)]
    pub link_filter: LinkFilterConfig,
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_max_concurrency() -> usize {
    1
}

fn default_batch_limit() -> usize {
    crate::batch::DEFAULT_RANK_LIMIT
}

fn default_search_limit() -> usize {
    5
}

fn default_crawl_endpoint() -> String {
    "http://localhost:7080/api/url_to_crawl".to_string()
}

fn default_search_endpoint() -> String {
    "http://localhost:7080/api/search_pages".to_string()
}

fn default_llm_endpoint() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_llm_model() -> String {
    "gemma3:12b".to_string()
}

fn default_suggestion_language() -> String {
    "Traditional Chinese".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    120
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            batch_limit: default_batch_limit(),
            search_limit: default_search_limit(),
            crawl_endpoint: default_crawl_endpoint(),
            search_endpoint: default_search_endpoint(),
            llm_endpoint: default_llm_endpoint(),
            llm_model: default_llm_model(),
            suggestion_language: default_suggestion_language(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
            link_filter: LinkFilterConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment variable if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::Config("max_concurrency must be at least 1".into()));
        }
        if self.batch_limit == 0 {
            return Err(Error::Config("batch_limit must be at least 1".into()));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(Error::Config("fetch_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.batch_limit, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AnalyzerConfig::from_json(r#"{"max_concurrency": 4, "llm_model": "llama3"}"#)
            .unwrap();
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.llm_model, "llama3");
        assert_eq!(config.search_limit, 5);
        assert!(config.link_filter.dedupe);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            AnalyzerConfig::from_json(r#"{"max_concurrency": 0}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AnalyzerConfig::from_json(r#"{"batch_limit": 0}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            AnalyzerConfig::from_json("not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"webdriver_url": "http://localhost:9515", "headless": false}}"#).unwrap();

        let config = AnalyzerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.webdriver_url, "http://localhost:9515");
        assert!(!config.headless);

        assert!(matches!(
            AnalyzerConfig::from_file("/definitely/not/here.json"),
            Err(Error::Io(_))
        ));
    }
}
