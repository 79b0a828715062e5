//! Robots.txt policy checking
//!
//! The crawler consults this as an external policy: given a URL and the
//! configured user agent, allow or deny. A deny is a permanent skip, never a
//! retried failure. robots.txt is fetched at most once per host and cached
//! in memory for the lifetime of the crawl; an unfetchable or missing file
//! means allow-all.

mod parser;

pub use parser::ParsedRobots;

use reqwest::Client;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Per-host robots.txt policy with an in-memory cache
pub struct RobotsPolicy {
    client: Client,
    user_agent: String,
    cache: Mutex<HashMap<String, ParsedRobots>>,
}

impl RobotsPolicy {
    pub fn new(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns whether the configured user agent may fetch `url`.
    ///
    /// URLs without a host are allowed through; they will fail eligibility
    /// checks elsewhere.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        let host_key = match host_key(url) {
            Some(key) => key,
            None => return true,
        };

        let cached = {
            let cache = self.cache.lock().expect("robots cache lock poisoned");
            cache.get(&host_key).cloned()
        };

        let robots = match cached {
            Some(robots) => robots,
            None => {
                let fetched = self.fetch_robots(url).await;
                let mut cache = self.cache.lock().expect("robots cache lock poisoned");
                cache.entry(host_key).or_insert(fetched).clone()
            }
        };

        robots.is_allowed(url.path(), &self.user_agent)
    }

    async fn fetch_robots(&self, url: &Url) -> ParsedRobots {
        let mut robots_url = url.clone();
        robots_url.set_path("/robots.txt");
        robots_url.set_query(None);
        robots_url.set_fragment(None);

        tracing::debug!("Fetching robots.txt from {}", robots_url);

        match self.client.get(robots_url.as_str()).send().await {
            Ok(response) if response.status().is_success() => match response.text().await {
                Ok(body) => ParsedRobots::from_content(&body),
                Err(e) => {
                    tracing::debug!("Failed to read robots.txt body: {}", e);
                    ParsedRobots::allow_all()
                }
            },
            Ok(response) => {
                tracing::debug!("robots.txt returned HTTP {}", response.status());
                ParsedRobots::allow_all()
            }
            Err(e) => {
                tracing::debug!("Failed to fetch robots.txt: {}", e);
                ParsedRobots::allow_all()
            }
        }
    }
}

/// Cache key covering scheme, host, and port, so http/https and distinct
/// ports do not share a policy
fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}://{}:{}", url.scheme(), host, port)),
        None => Some(format!("{}://{}", url.scheme(), host)),
    }
}
