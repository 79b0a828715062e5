use serde::Deserialize;
use std::time::Duration;

/// Immutable crawl configuration, constructed once before the crawl starts
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlConfig {
    /// Number of concurrent fetch workers
    #[serde(default = "defaults::workers")]
    pub workers: usize,

    /// Maximum link depth from the start URL
    #[serde(rename = "max-depth", default = "defaults::max_depth")]
    pub max_depth: u32,

    /// Maximum retries per URL after the first failed fetch
    #[serde(rename = "max-retries", default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Pacing delay between fetches issued by one worker (milliseconds)
    #[serde(rename = "delay-ms", default)]
    pub delay_ms: u64,

    /// Hosts the crawler may fetch from; empty means "start URL host only"
    #[serde(rename = "allowed-domains", default)]
    pub allowed_domains: Vec<String>,

    /// Overall crawl deadline in seconds; `None` runs until the frontier drains
    #[serde(rename = "timeout-secs", default)]
    pub timeout_secs: Option<u64>,

    /// Consult robots.txt before each fetch
    #[serde(rename = "respect-robots", default)]
    pub respect_robots: bool,

    /// User agent sent with every request and matched against robots.txt
    #[serde(rename = "user-agent", default = "defaults::user_agent")]
    pub user_agent: String,
}

mod defaults {
    pub fn workers() -> usize {
        4
    }

    pub fn max_depth() -> u32 {
        2
    }

    pub fn max_retries() -> u32 {
        2
    }

    pub fn user_agent() -> String {
        concat!("tidepool/", env!("CARGO_PKG_VERSION")).to_string()
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: defaults::workers(),
            max_depth: defaults::max_depth(),
            max_retries: defaults::max_retries(),
            delay_ms: 0,
            allowed_domains: Vec::new(),
            timeout_secs: None,
            respect_robots: false,
            user_agent: defaults::user_agent(),
        }
    }
}

impl CrawlConfig {
    /// Per-worker pacing delay
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Overall crawl deadline, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.delay_ms, 0);
        assert!(config.allowed_domains.is_empty());
        assert!(config.timeout_secs.is_none());
        assert!(!config.respect_robots);
        assert!(config.user_agent.starts_with("tidepool/"));
    }

    #[test]
    fn test_duration_helpers() {
        let config = CrawlConfig {
            delay_ms: 250,
            timeout_secs: Some(30),
            ..CrawlConfig::default()
        };
        assert_eq!(config.delay(), Duration::from_millis(250));
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }
}
