use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Configuration for cleaning up a list of candidate URLs before scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Regex patterns for URLs to drop (static assets, documents, ...)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Whether to drop repeated URLs, keeping the first occurrence
    #[serde(default = "default_dedupe")]
    pub dedupe: bool,
}

fn default_exclude_patterns() -> Vec<String> {
    vec![r"(?i)\.(jpg|jpeg|png|gif|css|js|ico|svg|woff|woff2|ttf|eot|pdf|zip)$".to_string()]
}

fn default_dedupe() -> bool {
    true
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: default_exclude_patterns(),
            dedupe: default_dedupe(),
        }
    }
}

/// Normalizes search and crawl link lists into URLs worth scoring
#[derive(Debug)]
pub struct LinkFilter {
    config: LinkFilterConfig,
    exclude_regexes: Vec<Regex>,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(LinkFilterConfig::default()).expect("Default regex patterns should be valid")
    }
}

impl LinkFilter {
    /// Create a new link filter from configuration
    pub fn new(config: LinkFilterConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            config,
            exclude_regexes,
        })
    }

    /// Whether a parsed URL should be scored at all
    pub fn accepts(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return false;
        }

        // Match on the path so query strings don't hide the extension
        let path = url.path();
        !self.exclude_regexes.iter().any(|re| re.is_match(path))
    }

    /// Copy of the URL without its fragment
    pub fn normalize_url(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }

    /// Parses, filters and normalizes `links`, preserving their order
    pub fn apply<S: AsRef<str>>(&self, links: &[S]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(links.len());

        for link in links {
            let raw = link.as_ref().trim();
            let Ok(url) = Url::parse(raw) else {
                ::log::debug!("Link filter rejected unparseable link: {}", raw);
                continue;
            };

            if !self.accepts(&url) {
                ::log::debug!("Link filter rejected: {}", url);
                continue;
            }

            let normalized = self.normalize_url(&url).to_string();
            if self.config.dedupe && !seen.insert(normalized.clone()) {
                ::log::trace!("Skipping duplicate link: {}", normalized);
                continue;
            }
            kept.push(normalized);
        }

        kept
    }
}
