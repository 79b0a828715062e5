use crate::UrlError;
use url::Url;

/// Normalizes a URL into the canonical form used as the visited-set key
///
/// Two links that normalize to the same string are the same page for
/// deduplication purposes. Steps:
///
/// 1. Parse; reject malformed input
/// 2. Reject schemes other than http/https
/// 3. Lowercase the host
/// 4. Strip the fragment
/// 5. Collapse an empty path to `/` and drop the trailing slash elsewhere
///
/// Query strings are kept as-is: `?page=2` is a different page.
pub fn normalize_url(raw: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(raw).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    url.set_fragment(None);

    let rewritten_path = {
        let path = url.path();
        if path.is_empty() {
            Some("/".to_string())
        } else if path.len() > 1 && path.ends_with('/') {
            Some(path.trim_end_matches('/').to_string())
        } else {
            None
        }
    };
    if let Some(path) = rewritten_path {
        url.set_path(&path);
    }

    Ok(url)
}
