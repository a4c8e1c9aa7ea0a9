use clap::{Parser, Subcommand};
use eeat_page::AnalyzerConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eeat-page")]
#[command(about = "Scores web pages against the E-E-A-T rubric")]
#[command(version)]
pub struct Args {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// WebDriver server used for live fetches
    #[arg(long, global = true)]
    pub webdriver_url: Option<String>,

    /// Number of pages scored at the same time in batch commands
    #[arg(short, long, global = true)]
    pub concurrency: Option<usize>,

    /// Seconds to wait for a live page to settle
    #[arg(long, global = true)]
    pub fetch_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a single page
    Analyze {
        /// URL of the page
        url: String,

        /// Previously downloaded HTML for the page, read before fetching live
        #[arg(long)]
        cached: Option<PathBuf>,
    },

    /// Score several pages and print the best ones
    Batch {
        /// URLs to score
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Crawl from a URL through the crawl service and rank the reports
    Crawl {
        /// Start URL
        url: String,
    },

    /// Search a keyword through the search service and score the results
    Search {
        /// Keyword to search for
        keyword: String,

        /// Number of links to request
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Ask the text generation service for advice on a saved report
    Suggest {
        /// JSON file holding a report printed by `analyze`
        report: PathBuf,
    },
}

impl Args {
    /// Builds the configuration: file (or defaults), environment, then flags
    pub fn load_config(&self) -> eeat_page::Result<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::from_file(path)?,
            None => AnalyzerConfig::default(),
        }
        .with_env_overrides();

        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.max_concurrency = concurrency;
        }
        if let Some(secs) = self.fetch_timeout {
            config.fetch_timeout_secs = secs;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::parse_from([
            "eeat-page",
            "--concurrency",
            "3",
            "--fetch-timeout",
            "10",
            "batch",
            "https://a.com/",
            "https://b.com/",
        ]);
        let config = args.load_config().unwrap();
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.fetch_timeout_secs, 10);
        assert!(matches!(args.command, Command::Batch { ref urls } if urls.len() == 2));
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let args = Args::parse_from(["eeat-page", "analyze", "https://a.com/", "-c", "0"]);
        assert!(args.load_config().is_err());
    }

    #[test]
    fn test_analyze_with_cache() {
        let args = Args::parse_from(["eeat-page", "analyze", "https://a.com/", "--cached", "a.html"]);
        match args.command {
            Command::Analyze { url, cached } => {
                assert_eq!(url, "https://a.com/");
                assert_eq!(cached, Some(PathBuf::from("a.html")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
