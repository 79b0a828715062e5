//! Crawler module: fetching, link extraction, workers, and coordination

mod coordinator;
mod extractor;
mod fetcher;
mod worker;

pub use coordinator::{Coordinator, CrawlOutcome, CrawlResult};
pub use extractor::{HtmlLinkExtractor, LinkExtractor};
pub use fetcher::{build_http_client, fetch_url, FetchOutcome};

use crate::config::CrawlConfig;
use crate::CrawlError;

/// Runs a complete crawl with the default link extractor
///
/// Convenience wrapper around [`Coordinator`]; the CLI uses this.
pub async fn crawl(config: CrawlConfig, start_url: &str) -> Result<CrawlResult, CrawlError> {
    let coordinator = Coordinator::new(config)?;
    coordinator.start(start_url).await
}
