//! Canonical request model
//!
//! Every capture dialect is decoded into a [`Request`]; everything downstream
//! (synthesis and code generation) works on this type only.

pub mod body;
pub mod url;

pub use self::body::{Body, FileField, FILE_PLACEHOLDER};
pub use self::url::Url;

use indexmap::IndexMap;

use crate::cookies::extract_cookies;

/// Ordered string map used for headers, cookies, params and form fields
pub type StringMap = IndexMap<String, String>;

/// Header names deduplicated case-insensitively on insert
pub const RESERVED_HEADERS: &[&str] = &[
    "cookie",
    "user-agent",
    "referer",
    "referrer-policy",
    "content-type",
];

/// A captured HTTP request
///
/// Equality ignores map ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Uppercase HTTP verb
    pub method: String,
    pub url: Url,
    pub headers: StringMap,
    pub cookies: StringMap,
    /// Copy of `url.query`
    pub params: StringMap,
    pub body: Body,
}

impl Request {
    pub fn new(method: &str, url: Url) -> Self {
        let params = url.query.clone();
        Self {
            method: method.trim().to_ascii_uppercase(),
            url,
            headers: StringMap::new(),
            cookies: StringMap::new(),
            params,
            body: Body::None,
        }
    }

    /// Insert a header, see [`insert_header`]
    pub fn insert_header(&mut self, name: &str, value: &str) {
        insert_header(&mut self.headers, name, value);
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Move every `cookie` header (any casing) into `cookies`
    ///
    /// Cookies already present are kept; header values fill in the rest.
    pub fn extract_cookie_header(&mut self) {
        let cookie_keys: Vec<String> = self
            .headers
            .keys()
            .filter(|k| k.eq_ignore_ascii_case("cookie"))
            .cloned()
            .collect();

        for key in cookie_keys {
            if let Some(value) = self.headers.shift_remove(&key) {
                for (name, value) in extract_cookies(&value) {
                    self.cookies.entry(name).or_insert(value);
                }
            }
        }
    }
}

/// Insert a header, deduplicating reserved names case-insensitively
///
/// When a reserved header already exists under another casing its value is
/// replaced and the existing key kept.
pub fn insert_header(headers: &mut StringMap, name: &str, value: &str) {
    let lower = name.to_ascii_lowercase();
    if RESERVED_HEADERS.contains(&lower.as_str()) {
        if let Some(existing) = headers.keys().find(|k| k.eq_ignore_ascii_case(name)).cloned() {
            headers.insert(existing, value.to_string());
            return;
        }
    }
    headers.insert(name.to_string(), value.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::new("get", Url::parse("https://httpbin.org/cookies?a=1").unwrap())
    }

    #[test]
    fn test_new_copies_query() {
        let req = request();
        assert_eq!(req.method, "GET");
        assert_eq!(req.params.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_reserved_header_dedup() {
        let mut req = request();
        req.insert_header("user-agent", "first");
        req.insert_header("User-Agent", "second");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers["user-agent"], "second");
    }

    #[test]
    fn test_other_headers_keep_casing() {
        let mut req = request();
        req.insert_header("X-Token", "a");
        req.insert_header("x-token", "b");
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn test_extract_cookie_header() {
        let mut req = request();
        req.insert_header("accept", "*/*");
        req.insert_header("Cookie", "hello=world; session=abc");
        req.extract_cookie_header();
        assert!(req.header("cookie").is_none());
        assert_eq!(req.cookies["hello"], "world");
        assert_eq!(req.cookies["session"], "abc");
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut a = request();
        a.insert_header("a", "1");
        a.insert_header("b", "2");
        let mut b = request();
        b.insert_header("b", "2");
        b.insert_header("a", "1");
        assert_eq!(a, b);
    }
}
