//! Cookie utilities

use cookie::Cookie;
use indexmap::IndexMap;
use tracing::debug;

/// Split a `Cookie` request header into name/value pairs
///
/// Malformed pairs are skipped; the first occurrence of a name wins.
pub fn extract_cookies(header: &str) -> IndexMap<String, String> {
    let mut cookies = IndexMap::new();
    for parsed in Cookie::split_parse(header) {
        match parsed {
            Ok(cookie) => {
                cookies
                    .entry(cookie.name().to_string())
                    .or_insert_with(|| cookie.value().to_string());
            }
            Err(e) => debug!(error = %e, "Skipping malformed cookie pair"),
        }
    }
    cookies
}
