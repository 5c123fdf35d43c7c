//! Browser `fetch()` captures
//!
//! Chromium's "Copy as fetch" emits:
//!
//! ```text
//! fetch("https://httpbin.org/cookies", {
//!   "headers": { "accept": "application/json", "cookie": "hello=world" },
//!   "referrer": "https://httpbin.org/",
//!   "referrerPolicy": "strict-origin-when-cross-origin",
//!   "body": null,
//!   "method": "GET",
//!   "mode": "cors"
//! });
//! ```
//!
//! The options object is valid JSON, so it is decoded with serde.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::request::{Body, Request, Url};

const SIGNATURE: &str = "fetch(";

/// The second argument of a captured `fetch()` call
#[derive(Debug, Deserialize)]
pub struct FetchOptions {
    pub headers: IndexMap<String, String>,
    pub referrer: Option<String>,
    #[serde(rename = "referrerPolicy")]
    pub referrer_policy: Option<String>,
    pub body: Option<Value>,
    pub method: Option<String>,
    pub mode: Option<String>,
}

pub fn is_fetch(text: &str) -> bool {
    text.trim_start().starts_with(SIGNATURE)
}

/// Parse a `fetch("<url>", {...});` capture
pub fn parse_fetch(text: &str) -> Option<Request> {
    let rest = text.trim().strip_prefix(SIGNATURE)?;
    let (raw_url, _) = rest.trim_start().strip_prefix('"')?.split_once('"')?;

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    let options: FetchOptions = match serde_json::from_str(&text[start..=end]) {
        Ok(options) => options,
        Err(e) => {
            debug!(error = %e, "fetch options are not valid JSON");
            return None;
        }
    };

    let url = match Url::parse(raw_url) {
        Ok(url) => url,
        Err(e) => {
            debug!(error = %e, "fetch URL rejected");
            return None;
        }
    };

    let mut request = Request::new(options.method.as_deref().unwrap_or("GET"), url);
    for (name, value) in &options.headers {
        request.insert_header(name, value);
    }
    if let Some(referrer) = &options.referrer {
        request.insert_header("referer", referrer);
    }
    if let Some(policy) = &options.referrer_policy {
        request.insert_header("referrer-policy", policy);
    }
    request.extract_cookie_header();

    request.body = match &options.body {
        None => Body::None,
        Some(Value::String(body)) => Body::parse(body, request.content_type()),
        Some(other) => Body::parse(&other.to_string(), request.content_type()),
    };

    Some(request)
}
