//! Clients for the services the analyzer delegates to: the crawl service,
//! the search service and a text generation endpoint.

pub mod suggest;


pub use suggest::{AdvisorSuggestion, AreaNote};

use crate::config::AnalyzerConfig;
use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body sent to the crawl service
#[derive(Debug, Serialize)]
struct CrawlRequest<'a> {
    url: &'a str,
    customer: &'a str,
    username: &'a str,
    #[serde(rename = "OU")]
    ou: &'a str,
    group_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CrawlResponse {
    #[serde(default)]
    reports: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    keyword: &'a str,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    links: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// HTTP client for the delegated services
#[derive(Debug, Clone)]
pub struct Upstream {
    client: Client,
    crawl_endpoint: String,
    search_endpoint: String,
    llm_endpoint: String,
    llm_model: String,
}

impl Upstream {
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.upstream_timeout())
            .build()?;

        Ok(Self {
            client,
            crawl_endpoint: config.crawl_endpoint.clone(),
            search_endpoint: config.search_endpoint.clone(),
            llm_endpoint: config.llm_endpoint.clone(),
            llm_model: config.llm_model.clone(),
        })
    }

    /// Asks the crawl service to crawl from `url`; returns its raw reports
    pub async fn crawl(&self, url: &str) -> Result<Vec<Value>> {
        ::log::info!("Requesting crawl from {} for {}", self.crawl_endpoint, url);
        let body = CrawlRequest {
            url,
            customer: "default",
            username: "guest",
            ou: "guest",
            group_names: Vec::new(),
        };

        let response: CrawlResponse = self.post_json("crawl", &self.crawl_endpoint, &body).await?;
        ::log::info!("Crawl service returned {} reports", response.reports.len());
        Ok(response.reports)
    }

    /// Asks the search service for up to `limit` result links for `keyword`
    pub async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<String>> {
        ::log::info!("Requesting search for {:?} (limit {})", keyword, limit);
        let body = SearchRequest { keyword, limit };

        let response: SearchResponse =
            self.post_json("search", &self.search_endpoint, &body).await?;
        ::log::info!("Search service returned {} links", response.links.len());
        Ok(response.links)
    }

    /// Runs `prompt` through the text generation endpoint and returns the raw text
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            model: &self.llm_model,
            prompt,
            stream: false,
        };

        let response: GenerateResponse = self.post_json("llm", &self.llm_endpoint, &body).await?;
        ::log::debug!("Raw generation response:\n{}", response.response);
        Ok(response.response)
    }

    async fn post_json<B, R>(&self, service: &'static str, endpoint: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let response = self.client.post(endpoint).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            ::log::error!("{} service at {} answered {}", service, endpoint, status);
            return Err(Error::UpstreamStatus { service, status });
        }

        Ok(response.json::<R>().await?)
    }
}
