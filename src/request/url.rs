//! URL decomposition
//!
//! Splits a captured URL into the parts code generation needs. The `url`
//! crate is only used for query decoding: its serializer normalizes default
//! ports and empty paths, while `Display` here must reproduce the captured
//! URL minus its query string.

use std::fmt;
use std::str::FromStr;

use ::url::form_urlencoded;
use indexmap::IndexMap;

use crate::errors::{ReqforgeError, Result};

/// A decomposed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    pub scheme: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Leading label split off hosts with two or more dots (`www` in `www.example.com`)
    pub subdomain: Option<String>,
    /// Host without its subdomain (`example.com`)
    pub domain: String,
    /// First label of `domain` (`example`)
    pub domain_name: String,
    pub port: Option<u16>,
    /// Path including any `;params` segment
    pub path: String,
    /// Decoded query, first occurrence wins
    pub query: IndexMap<String, String>,
    pub fragment: Option<String>,
    /// `user:pass@host:port` exactly as captured
    network_location: String,
}

impl Url {
    /// Parse a URL string
    ///
    /// Fails only when no scheme or host can be found.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let malformed = || ReqforgeError::MalformedUrl(input.to_string());

        let (scheme, rest) = input.split_once("://").ok_or_else(malformed)?;
        if !is_scheme(scheme) {
            return Err(malformed());
        }

        let (rest, fragment) = match rest.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (rest, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, query),
            None => (rest, ""),
        };
        let (network_location, path) = match rest.find('/') {
            Some(idx) => rest.split_at(idx),
            None => (rest, ""),
        };

        let (credentials, host_port) = match network_location.rsplit_once('@') {
            Some((credentials, host_port)) => (Some(credentials), host_port),
            None => (None, network_location),
        };
        let (username, password) = match credentials {
            Some(credentials) => match credentials.split_once(':') {
                Some((user, pass)) => (Some(user.to_string()), Some(pass.to_string())),
                None => (Some(credentials.to_string()), None),
            },
            None => (None, None),
        };

        let (host, port) = split_host_port(host_port);
        if host.is_empty() {
            return Err(malformed());
        }
        let host = host.to_ascii_lowercase();

        let (subdomain, domain) = split_subdomain(&host);
        let domain_name = domain
            .split('.')
            .next()
            .unwrap_or(domain.as_str())
            .to_string();

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            username,
            password,
            subdomain,
            domain,
            domain_name,
            port,
            path: path.to_string(),
            query: parse_query(query),
            fragment: fragment.filter(|f| !f.is_empty()).map(String::from),
            network_location: network_location.to_string(),
        })
    }

    /// Full host, subdomain included
    pub fn host(&self) -> String {
        match &self.subdomain {
            Some(subdomain) => format!("{}.{}", subdomain, self.domain),
            None => self.domain.clone(),
        }
    }

    /// Path segments in order, empty segments dropped
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }
}

impl FromStr for Url {
    type Err = ReqforgeError;

    fn from_str(s: &str) -> Result<Self> {
        Url::parse(s)
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.network_location, self.path)?;
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

fn is_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Split `host[:port]`; bracketed IPv6 hosts keep their brackets
fn split_host_port(host_port: &str) -> (&str, Option<u16>) {
    if host_port.starts_with('[') {
        return match host_port.find(']') {
            Some(end) => {
                let port = host_port[end + 1..]
                    .strip_prefix(':')
                    .and_then(parse_port);
                (&host_port[..=end], port)
            }
            None => (host_port, None),
        };
    }

    match host_port.rsplit_once(':') {
        Some((host, port)) => (host, parse_port(port)),
        None => (host_port, None),
    }
}

fn parse_port(port: &str) -> Option<u16> {
    if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    port.parse().ok()
}

// Hosts with two or more dots are assumed to carry a subdomain. Wrong for
// second-level registries such as `.co.uk`, kept for stable class names.
fn split_subdomain(host: &str) -> (Option<String>, String) {
    if host.starts_with('[') || host.matches('.').count() < 2 {
        return (None, host.to_string());
    }
    match host.split_once('.') {
        Some((subdomain, domain)) => (Some(subdomain.to_string()), domain.to_string()),
        None => (None, host.to_string()),
    }
}

/// Decode an `application/x-www-form-urlencoded` string, first occurrence wins
pub fn parse_query(query: &str) -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        map.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    map
}
