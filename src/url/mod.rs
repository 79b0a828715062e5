//! URL handling for tidepool
//!
//! Provides the crawl-eligibility check applied to every discovered link,
//! plus normalization (the normalized string form is the visited-set key)
//! and host extraction for the domain allow-list.

mod normalize;

pub use normalize::normalize_url;

use url::Url;

/// Path extensions that never point at a crawlable page: images, archives,
/// documents, and media.
const SKIP_EXTENSIONS: &[&str] = &[
    // Images
    "jpg", "jpeg", "png", "gif", "webp", "svg", "ico", "bmp", "tiff",
    // Archives
    "zip", "tar", "gz", "bz2", "xz", "rar", "7z",
    // Documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "rtf",
    // Media
    "mp3", "mp4", "m4a", "avi", "mov", "mkv", "webm", "wav", "flac", "ogg",
];

/// Classifies a discovered link as crawl-eligible.
///
/// Pure and infallible: malformed input simply yields `false`. Rejects
/// unparseable URLs, non-http(s) schemes, URLs carrying a fragment, and
/// paths ending in a known non-page extension.
pub fn is_eligible(raw: &str) -> bool {
    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return false,
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }

    if parsed.fragment().is_some() {
        return false;
    }

    !has_skipped_extension(parsed.path())
}

/// Extracts the host of a URL, lowercased, for allow-list comparison
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

fn has_skipped_extension(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    match last_segment.rsplit_once('.') {
        Some((_, ext)) => SKIP_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}
