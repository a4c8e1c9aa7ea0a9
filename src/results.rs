use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Signals extracted from a single HTML snapshot of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFacts {
    /// URL the snapshot was taken from
    pub url: String,

    /// Lowercased host of `url`
    pub hostname: String,

    /// Title of the page (social-share title, then title meta, then `<title>`)
    pub title: Option<String>,

    /// Value of the author meta tag
    pub author: Option<String>,

    /// Value of the date or published-time meta tag
    pub publish_date: Option<String>,

    /// A JSON-LD block declares exactly `FAQPage`
    #[serde(rename = "hasFAQSchema")]
    pub has_faq_schema: bool,

    /// A JSON-LD block declares exactly `Article`
    pub has_article_schema: bool,

    /// Every `@type` token across all JSON-LD blocks, in document order
    pub schema_types: Vec<String>,

    /// Links whose target host differs from `hostname`
    pub external_links_count: usize,

    /// Some element carries a review/comment class
    pub has_user_reviews: bool,

    /// Some link points at an author or about page
    pub has_author_page: bool,
}

impl PageFacts {
    /// Creates facts with every signal absent.
    ///
    /// Fails only if `url` cannot be parsed or carries no host.
    pub fn empty(url: &str) -> Result<Self> {
        let hostname = hostname_of(url)?;
        Ok(Self {
            url: url.to_string(),
            hostname,
            title: None,
            author: None,
            publish_date: None,
            has_faq_schema: false,
            has_article_schema: false,
            schema_types: Vec::new(),
            external_links_count: 0,
            has_user_reviews: false,
            has_author_page: false,
        })
    }
}

/// Parses `url` and returns its lowercased host.
///
/// Only an unparseable URL is an error. URLs without a host (`file:`,
/// `mailto:`, `data:`) yield an empty hostname.
pub fn hostname_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|e| Error::MalformedUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    Ok(parsed.host_str().unwrap_or_default().to_lowercase())
}

/// The four E-E-A-T sub-scores, each in `0..=5`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub experience: u8,
    pub expertise: u8,
    pub authoritativeness: u8,
    pub trustworthiness: u8,
}

impl Scores {
    pub fn total(&self) -> u8 {
        self.experience + self.expertise + self.authoritativeness + self.trustworthiness
    }
}

/// Broad category of an improvement suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    Structure,
    Schema,
}

/// Missing signal a suggestion addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    MissingAuthor,
    MissingFaqSchema,
    MissingArticleSchema,
    MissingPublishDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    pub issue: IssueCode,
    pub message: String,
    pub action: String,
}

/// Scored and annotated result for one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EeatReport {
    pub title: Option<String>,
    pub url: String,
    pub scores: Scores,
    pub total_score: u8,
    pub suggestions: Vec<Suggestion>,
}
