//! HTTP fetcher
//!
//! One fetch, one classified outcome. The worker decides what to do with a
//! failure (retry or count); this module only distinguishes "got a page",
//! "got a non-HTML body", and "failed in a way worth retrying".

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Result of fetching one URL
#[derive(Debug)]
pub enum FetchOutcome {
    /// 2xx response
    Success {
        status: u16,
        body: String,
        /// Whether the Content-Type says the body is HTML; non-HTML pages
        /// are still counted as visited but yield no links
        is_html: bool,
    },

    /// Non-2xx status or transport error; retryable up to the configured limit
    Failed { reason: String },
}

/// Builds the shared HTTP client
///
/// Redirects follow reqwest's default policy; TLS, pooling, and the rest of
/// the transport are the client's concern, not the crawler's.
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the result
pub async fn fetch_url(client: &Client, url: &Url) -> FetchOutcome {
    let response = match client.get(url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchOutcome::Failed {
                reason: classify_transport_error(&e),
            }
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchOutcome::Failed {
            reason: format!("HTTP {}", status.as_u16()),
        };
    }

    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("text/html"))
        // No Content-Type header: assume HTML and let the parser sort it out
        .unwrap_or(true);

    match response.text().await {
        Ok(body) => FetchOutcome::Success {
            status: status.as_u16(),
            body,
            is_html,
        },
        Err(e) => FetchOutcome::Failed {
            reason: format!("body read failed: {}", e),
        },
    }
}

fn classify_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        "connection failed".to_string()
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client("tidepool-test/0.1").is_ok());
    }
}
