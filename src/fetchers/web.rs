use crate::error::{Error, Result};
use crate::fetchers::FetchPage;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout_at};

/// Reports `[document.readyState, number of loaded resources]`
const SETTLE_STATE: &str =
    "return [document.readyState, performance.getEntriesByType('resource').length];";

/// The resource count must stay unchanged for this long to count as settled
const SETTLE_WINDOW: Duration = Duration::from_millis(500);

/// Common local WebDriver endpoints tried when the configured one is down
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444",
];

/// Loads rendered pages through a WebDriver server (e.g. ChromeDriver).
///
/// Every fetch opens its own session and closes it afterwards.
#[derive(Debug, Clone)]
pub struct WebDriverFetcher {
    webdriver_url: String,
    headless: bool,
}

impl WebDriverFetcher {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless: true,
        }
    }

    /// Run the browser with or without a visible window
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }

    /// Connects to the configured WebDriver, then to the usual local ports
    async fn connect(&self, page_url: &str) -> Result<Client> {
        let mut builder = ClientBuilder::native();
        if self.headless {
            builder.capabilities(headless_capabilities());
        }

        match builder.connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        for url in FALLBACK_WEBDRIVER_URLS {
            if url == self.webdriver_url {
                continue;
            }
            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = builder.connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(Error::fetch(page_url, "no WebDriver server reachable"))
    }
}

impl FetchPage for WebDriverFetcher {
    async fn fetch_live(&self, url: &str, limit: Duration) -> Result<String> {
        let started = Instant::now();
        // One deadline covers connecting (fallbacks included) and loading
        let deadline = started + limit;

        let client = match timeout_at(deadline, self.connect(url)).await {
            Ok(client) => client?,
            Err(_) => {
                ::log::error!("Timeout connecting to WebDriver for: {}", url);
                return Err(Error::fetch(
                    url,
                    format!("no WebDriver session within {}s", limit.as_secs()),
                ));
            }
        };

        let loaded = timeout_at(deadline, load_settled(&client, url)).await;

        if let Err(e) = client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }

        let html = match loaded {
            Ok(result) => result?,
            Err(_) => {
                ::log::error!("Timeout loading: {}", url);
                return Err(Error::fetch(
                    url,
                    format!("page did not settle within {}s", limit.as_secs()),
                ));
            }
        };

        ::log::debug!(
            "Loaded {} ({} bytes) in {:.2} seconds",
            url,
            html.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(html)
    }
}

/// Navigates, waits for the page to settle and returns its serialized markup
async fn load_settled(client: &Client, url: &str) -> Result<String> {
    client
        .goto(url)
        .await
        .map_err(|e| navigation_error(e, "navigating to", url))?;

    wait_until_settled(client)
        .await
        .map_err(|e| navigation_error(e, "waiting for", url))?;

    client
        .source()
        .await
        .map_err(|e| navigation_error(e, "getting source for", url))
}

/// Polls until the document is complete and no new resources load for one window
async fn wait_until_settled(client: &Client) -> std::result::Result<(), fantoccini::error::CmdError> {
    let mut last_count = None;

    loop {
        let state = client.execute(SETTLE_STATE, Vec::new()).await?;
        let complete = state.get(0).and_then(Value::as_str) == Some("complete");
        let count = state.get(1).and_then(Value::as_u64);

        if complete && count.is_some() && count == last_count {
            return Ok(());
        }

        last_count = if complete { count } else { None };
        sleep(SETTLE_WINDOW).await;
    }
}

fn headless_capabilities() -> Capabilities {
    let mut caps = Capabilities::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({
            "args": ["--headless=new", "--no-sandbox", "--disable-setuid-sandbox"]
        }),
    );
    caps
}

fn navigation_error(error: fantoccini::error::CmdError, context: &str, url: &str) -> Error {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session while {} {}", context, url);
    } else {
        ::log::error!("Failed {} {}: {}", context, url, error);
    }
    Error::fetch(url, format!("{} page: {}", context, error))
}
