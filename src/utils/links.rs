//! Link normalisation for the url whitelist.

const PREFIXES: [&str; 3] = ["https://", "http://", "www."];

/// Strip the first matching scheme or `www.` prefix.
///
/// Only one prefix is removed, so `https://www.x.org` keeps its `www.`.
pub fn normalize_link(url: &str) -> String {
    let url = url.trim();
    PREFIXES
        .iter()
        .find_map(|prefix| url.strip_prefix(prefix))
        .unwrap_or(url)
        .to_string()
}
