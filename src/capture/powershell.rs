//! PowerShell `Invoke-WebRequest` captures
//!
//! Chromium's "Copy as PowerShell" emits an optional web session preamble
//! followed by a single command continued over several lines:
//!
//! ```text
//! $session = New-Object Microsoft.PowerShell.Commands.WebRequestSession
//! $session.UserAgent = "Mozilla/5.0 ..."
//! $session.Cookies.Add((New-Object System.Net.Cookie("hello", "world", "/", "httpbin.org")))
//! Invoke-WebRequest -UseBasicParsing -Uri "https://httpbin.org/cookies" `
//! -WebSession $session `
//! -Headers @{
//! "method"="GET"
//!   "accept"="application/json"
//! }
//! ```
//!
//! Backticks are PowerShell's escape and continuation character. They are
//! rewritten to backslashes up front so a single escape decoder handles both
//! PowerShell and hand-edited captures.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::request::{insert_header, Body, Request, StringMap, Url};
use crate::strings::unescape;

const SIGNATURE: &str = "Invoke-WebRequest";
const URI_ARG: &str = "-Uri";

static USER_AGENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\$session\.UserAgent\s*=\s*"((?:[^"\\]|\\.)*)""#)
        .expect("Invalid user agent regex")
});

static COOKIE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"System\.Net\.Cookie\(\s*"((?:[^"\\]|\\.)*)"\s*,\s*"((?:[^"\\]|\\.)*)""#)
        .expect("Invalid cookie regex")
});

/// State collected from `$session` lines
#[derive(Debug, Default)]
struct Session {
    user_agent: Option<String>,
    cookies: StringMap,
}

impl Session {
    fn consume(&mut self, line: &str) {
        if let Some(caps) = USER_AGENT_RE.captures(line) {
            self.user_agent = Some(unescape(&caps[1]));
        } else if let Some(caps) = COOKIE_RE.captures(line) {
            self.cookies
                .entry(unescape(&caps[1]))
                .or_insert_with(|| unescape(&caps[2]));
        }
    }
}

/// Arguments of the `Invoke-WebRequest` call that matter for the request
#[derive(Debug, Default, PartialEq)]
pub struct InvokeArgs {
    pub uri: Option<String>,
    pub method: Option<String>,
    /// Raw `@{ ... }` hashtable
    pub headers: Option<String>,
    pub content_type: Option<String>,
    /// Body with escapes still encoded
    pub body: Option<String>,
}

impl InvokeArgs {
    /// Group `-Name value...` tokens; tokens before the first argument are ignored
    fn from_tokens(tokens: &[String]) -> Self {
        let mut grouped: Vec<(String, Vec<&str>)> = Vec::new();
        for token in tokens {
            if is_arg_name(token) {
                grouped.push((token[1..].to_ascii_lowercase(), Vec::new()));
            } else if let Some((_, values)) = grouped.last_mut() {
                values.push(token);
            }
        }

        let mut args = Self::default();
        for (name, values) in grouped {
            let value = values.join(" ");
            match name.as_str() {
                "uri" => args.uri = Some(strip_quotes(&value).to_string()),
                "method" => args.method = Some(strip_quotes(&value).to_string()),
                "headers" => args.headers = Some(value),
                "contenttype" => args.content_type = Some(strip_quotes(&value).to_string()),
                "body" => args.body = Some(strip_quotes(&value).to_string()),
                other => debug!(arg = %other, "Ignoring Invoke-WebRequest argument"),
            }
        }
        args
    }
}

pub fn is_powershell(text: &str) -> bool {
    text.contains(SIGNATURE) && text.contains(URI_ARG)
}

/// Parse an `Invoke-WebRequest` capture
pub fn parse_powershell(text: &str) -> Option<Request> {
    if !is_powershell(text) {
        return None;
    }

    let text = text.replace('`', "\\");
    let mut session = Session::default();
    let mut command_lines: Vec<&str> = Vec::new();

    for line in text.lines().map(strip_continuation) {
        let trimmed = line.trim();
        if command_lines.is_empty() {
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with("$session") {
                session.consume(trimmed);
                continue;
            }
        }
        command_lines.push(line);
    }

    let command = command_lines.join("\n");
    let start = command.find(SIGNATURE)? + SIGNATURE.len();
    let args = InvokeArgs::from_tokens(&tokenize(&command[start..]));

    let raw_uri = args.uri.as_deref()?;
    let url = match Url::parse(raw_uri) {
        Ok(url) => url,
        Err(e) => {
            debug!(error = %e, "Invoke-WebRequest URI rejected");
            return None;
        }
    };

    let mut headers = StringMap::new();
    if let Some(table) = &args.headers {
        for (name, value) in parse_hashtable(table) {
            insert_header(&mut headers, &name, &value);
        }
    }
    let pseudo_method = pop_header(&mut headers, "method");
    let method = args.method.clone().or(pseudo_method);

    let mut request = Request::new(method.as_deref().unwrap_or("GET"), url);
    for (name, value) in &headers {
        request.insert_header(name, value);
    }
    if let Some(user_agent) = &session.user_agent {
        request.insert_header("user-agent", user_agent);
    }
    request.cookies = session.cookies;
    request.extract_cookie_header();

    if let Some(body) = &args.body {
        let content_type = args
            .content_type
            .as_deref()
            .or_else(|| request.content_type())
            .map(String::from);
        request.body = Body::parse(&unescape(body), content_type.as_deref());
    }

    Some(request)
}

/// Drop a trailing continuation backslash
fn strip_continuation(line: &str) -> &str {
    let trimmed = line.trim_end();
    match trimmed.strip_suffix('\\') {
        Some(rest) if rest.is_empty() || rest.ends_with(char::is_whitespace) => rest.trim_end(),
        _ => trimmed,
    }
}

fn is_arg_name(token: &str) -> bool {
    let mut chars = token.chars();
    chars.next() == Some('-')
        && matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Split a command into whitespace separated tokens
///
/// Quoted strings and `{ ... }` blocks stay in one token, quotes and escapes
/// included.
fn tokenize(command: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut escape_next = false;

    for c in command.chars() {
        if escape_next {
            current.push(c);
            escape_next = false;
            continue;
        }

        match c {
            '\\' if quote == Some('"') => {
                current.push(c);
                escape_next = true;
            }
            '"' | '\'' if quote.is_none() => {
                quote = Some(c);
                current.push(c);
            }
            c if quote == Some(c) => {
                quote = None;
                current.push(c);
            }
            '{' if quote.is_none() => {
                depth += 1;
                current.push(c);
            }
            '}' if quote.is_none() && depth > 0 => {
                depth -= 1;
                current.push(c);
            }
            c if c.is_whitespace() && quote.is_none() && depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Parse `@{ "name"="value" ... }` into unescaped pairs
///
/// Entries without `=` are skipped.
fn parse_hashtable(table: &str) -> Vec<(String, String)> {
    let Some(inner) = table
        .trim()
        .strip_prefix("@{")
        .and_then(|t| t.strip_suffix('}'))
    else {
        debug!("Headers argument is not a hashtable");
        return Vec::new();
    };

    let mut entries = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace() || *c == ';').is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let key = read_item(&mut chars);
        while chars.next_if(|c| *c == ' ' || *c == '\t').is_some() {}
        if chars.next_if_eq(&'=').is_none() {
            debug!(key = %key, "Skipping hashtable entry without '='");
            while chars.next_if(|c| !c.is_whitespace() && *c != ';').is_some() {}
            continue;
        }
        while chars.next_if(|c| *c == ' ' || *c == '\t').is_some() {}
        let value = read_item(&mut chars);
        if key.is_empty() {
            debug!("Skipping hashtable entry without a name");
            continue;
        }

        entries.push((unescape(&key), unescape(&value)));
    }

    entries
}

/// Read a quoted string (escapes kept) or a bare word
fn read_item(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut item = String::new();

    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            while let Some(c) = chars.next() {
                if c == quote {
                    break;
                }
                item.push(c);
                if c == '\\' && quote == '"' {
                    if let Some(escaped) = chars.next() {
                        item.push(escaped);
                    }
                }
            }
        }
        Some(_) => {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace() && *c != '=' && *c != ';') {
                item.push(c);
            }
            if item.is_empty() {
                chars.next_if(|c| *c != '=');
            }
        }
        None => {}
    }

    item
}

/// Remove a header by case-insensitive name, returning its value
fn pop_header(headers: &mut StringMap, name: &str) -> Option<String> {
    let key = headers.keys().find(|k| k.eq_ignore_ascii_case(name)).cloned()?;
    headers.shift_remove(&key)
}
