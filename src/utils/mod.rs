//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Build a search URL by appending query parameters to a base URL.
///
/// Empty values are skipped so boards never see `l=`.
pub fn build_search_url(base: &str, params: &[(&str, &str)]) -> crate::error::Result<Url> {
    let mut url = Url::parse(base)?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            if !value.trim().is_empty() {
                pairs.append_pair(key, value.trim());
            }
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
    Ok(url)
}
