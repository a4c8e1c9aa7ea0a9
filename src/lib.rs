// Re-export modules
pub mod batch;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod scoring;
pub mod upstream;

// Re-export commonly used types for convenience
pub use batch::ExternalReport;
pub use config::AnalyzerConfig;
pub use error::{Error, Result};
pub use fetchers::{ContentSource, FetchPage, WebDriverFetcher};
pub use parsers::extract;
pub use results::{EeatReport, PageFacts, Scores, Suggestion};
pub use scoring::evaluate;
pub use upstream::AdvisorSuggestion;

use batch::Outcome;
use filter::LinkFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use upstream::Upstream;

/// Scores of the pages behind a search keyword
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub keyword: String,
    pub links: Vec<String>,
    pub reports: Vec<EeatReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Fetches, extracts and scores pages, alone or in batches
pub struct Analyzer<F = WebDriverFetcher> {
    fetcher: Arc<F>,
    config: AnalyzerConfig,
    upstream: Upstream,
    link_filter: Arc<LinkFilter>,
}

impl<F> Clone for Analyzer<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            config: self.config.clone(),
            upstream: self.upstream.clone(),
            link_filter: Arc::clone(&self.link_filter),
        }
    }
}

impl Analyzer<WebDriverFetcher> {
    /// Create an analyzer that loads live pages through WebDriver
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let fetcher =
            WebDriverFetcher::new(config.webdriver_url.clone()).with_headless(config.headless);
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: FetchPage + 'static> Analyzer<F> {
    /// Create an analyzer with a custom page fetcher
    pub fn with_fetcher(config: AnalyzerConfig, fetcher: F) -> Result<Self> {
        config.validate()?;
        let link_filter = LinkFilter::new(config.link_filter.clone())
            .map_err(|e| Error::Config(format!("invalid link filter pattern: {}", e)))?;

        Ok(Self {
            fetcher: Arc::new(fetcher),
            upstream: Upstream::new(&config)?,
            link_filter: Arc::new(link_filter),
            config,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Scores one page, reading `cached` first when given.
    ///
    /// A URL that cannot be parsed fails before anything is fetched.
    pub async fn analyze(&self, url: &str, cached: Option<PathBuf>) -> Result<EeatReport> {
        results::hostname_of(url)?;

        let html = fetchers::fetch_with_fallback(
            self.fetcher.as_ref(),
            url,
            cached,
            self.config.fetch_timeout(),
        )
        .await?;

        let facts = extract(&html, url)?;
        let report = evaluate(&facts);
        ::log::info!("Scored {}: {}/20", url, report.total_score);
        Ok(report)
    }

    /// Scores every URL and returns the best `batch_limit` reports.
    ///
    /// Failing URLs are logged and left out.
    pub async fn analyze_many(&self, urls: &[String]) -> Vec<EeatReport> {
        let outcomes = self.score_all(urls).await;
        batch::rank(outcomes, self.config.batch_limit)
    }

    async fn score_all(&self, urls: &[String]) -> Vec<Outcome> {
        ::log::info!(
            "Scoring {} URLs with concurrency {}",
            urls.len(),
            self.config.max_concurrency
        );

        if self.config.max_concurrency <= 1 {
            return batch::evaluate_many(urls, |url| async move { self.analyze(&url, None).await })
                .await;
        }

        let analyzer = self.clone();
        batch::evaluate_many_concurrent(
            urls,
            move |url| {
                let analyzer = analyzer.clone();
                async move { analyzer.analyze(&url, None).await }
            },
            self.config.max_concurrency,
        )
        .await
    }

    /// Delegates a crawl from `url` and ranks the reports it returns.
    ///
    /// An empty crawl is an error; reports without a `url` or a numeric
    /// `totalScore` are dropped.
    pub async fn crawl(&self, url: &str) -> Result<Vec<ExternalReport>> {
        let values = self.upstream.crawl(url).await?;
        if values.is_empty() {
            return Err(Error::NoResults(format!("crawl of {} returned no reports", url)));
        }
        Ok(batch::rank_values(values, self.config.batch_limit))
    }

    /// Searches `keyword` through the search service and scores the result links.
    ///
    /// No links is not an error: the report comes back empty with a warning.
    pub async fn search(&self, keyword: &str, limit: Option<usize>) -> Result<SearchReport> {
        let limit = limit.unwrap_or(self.config.search_limit);
        let links = self.upstream.search(keyword, limit).await?;

        if links.is_empty() {
            ::log::warn!("Search for {:?} returned no links", keyword);
            return Ok(SearchReport {
                keyword: keyword.to_string(),
                links,
                reports: Vec::new(),
                warning: Some(
                    "Search returned no results; the search provider may be rate limiting or its layout may have changed"
                        .to_string(),
                ),
            });
        }

        let candidates = self.link_filter.apply(&links);
        let reports = self.analyze_many(&candidates).await;

        Ok(SearchReport {
            keyword: keyword.to_string(),
            links,
            reports,
            warning: None,
        })
    }

    /// Asks the text generation service for improvement advice on `report`.
    ///
    /// Transport failures are errors; an unusable answer yields the placeholder.
    pub async fn suggest(&self, report: &EeatReport) -> Result<AdvisorSuggestion> {
        let prompt = upstream::suggest::build_prompt(report, &self.config.suggestion_language);
        let raw = self.upstream.generate(&prompt).await?;
        Ok(upstream::suggest::parse_suggestion(&raw))
    }
}
