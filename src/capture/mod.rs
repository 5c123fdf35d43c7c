//! Capture dialect parsers
//!
//! A capture is the text a browser's "Copy as ..." menu produces for a
//! request. Each dialect module exposes a cheap signature check and a parser
//! returning `None` when the text is not in its format.

pub mod fetch;
pub mod powershell;

pub use fetch::parse_fetch;
pub use powershell::parse_powershell;

use tracing::debug;

use crate::request::Request;

type Recognizer = fn(&str) -> bool;
type DialectParser = fn(&str) -> Option<Request>;

/// Dialects in priority order
const DIALECTS: &[(&str, Recognizer, DialectParser)] = &[
    ("fetch", fetch::is_fetch, parse_fetch),
    ("powershell", powershell::is_powershell, parse_powershell),
];

/// Parse a capture in any supported dialect
///
/// Returns `None` when no dialect recognizes the text.
pub fn parse_input(text: &str) -> Option<Request> {
    for (dialect, recognizes, parse) in DIALECTS {
        if !recognizes(text) {
            continue;
        }
        debug!(dialect = %dialect, "Trying capture dialect");
        if let Some(request) = parse(text) {
            return Some(request);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_fetch() {
        let text = r#"fetch("https://example.com/api", {"headers": {}});"#;
        let request = parse_input(text).unwrap();
        assert_eq!(request.url.to_string(), "https://example.com/api");
    }

    #[test]
    fn test_dispatch_powershell() {
        let text = r#"Invoke-WebRequest -Uri "https://example.com/api" -Method "DELETE""#;
        let request = parse_input(text).unwrap();
        assert_eq!(request.method, "DELETE");
    }

    #[test]
    fn test_unknown_text() {
        assert!(parse_input("curl https://example.com").is_none());
        assert!(parse_input("").is_none());
    }
}
