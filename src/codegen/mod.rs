//! Python code generation
//!
//! Renders synthesized classes, or single requests as standalone snippets,
//! for one of four client flavors:
//!
//! | sync  | alternate client | client              |
//! |-------|------------------|---------------------|
//! | true  | false            | `requests`          |
//! | true  | true             | `httpx`             |
//! | false | false            | `aiohttp`           |
//! | false | true             | `httpx.AsyncClient` |
//!
//! Every generated module is parsed before it is returned; output that does
//! not parse is reported as
//! [`ReqforgeError::GeneratedSyntax`](crate::errors::ReqforgeError::GeneratedSyntax).

pub mod literal;
mod render;

use tracing::warn;

use crate::errors::Result;
use crate::request::Request;
use crate::synth::{Class, Synthesizer};

/// Toggles controlling the generated code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Synchronous code (`requests`/`httpx`) instead of `async`
    pub sync: bool,
    /// Use `httpx` instead of `requests` or `aiohttp`
    pub alternate_client: bool,
    /// Return `response.text` instead of parsed JSON
    pub return_text: bool,
    /// Leave every header out
    pub no_headers: bool,
    /// Leave every cookie out
    pub no_cookies: bool,
    /// Put every request into one class with this name
    pub class_name: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            sync: true,
            alternate_client: false,
            return_text: false,
            no_headers: false,
            no_cookies: false,
            class_name: None,
        }
    }
}

impl GenerateOptions {
    pub fn flavor(&self) -> Flavor {
        match (self.sync, self.alternate_client) {
            (true, false) => Flavor::Requests,
            (true, true) => Flavor::Httpx,
            (false, false) => Flavor::Aiohttp,
            (false, true) => Flavor::HttpxAsync,
        }
    }
}

/// HTTP client the generated code uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Requests,
    Httpx,
    Aiohttp,
    HttpxAsync,
}

impl Flavor {
    pub fn is_async(self) -> bool {
        matches!(self, Flavor::Aiohttp | Flavor::HttpxAsync)
    }

    /// Python module imported by the generated code
    pub fn module(self) -> &'static str {
        match self {
            Flavor::Requests => "requests",
            Flavor::Httpx | Flavor::HttpxAsync => "httpx",
            Flavor::Aiohttp => "aiohttp",
        }
    }

    fn is_httpx(self) -> bool {
        matches!(self, Flavor::Httpx | Flavor::HttpxAsync)
    }
}

/// Render one class as a complete Python module
pub fn generate_class(class: &Class, options: &GenerateOptions) -> Result<String> {
    generate_classes(std::slice::from_ref(class), options)
}

/// Render several classes into one Python module
pub fn generate_classes(classes: &[Class], options: &GenerateOptions) -> Result<String> {
    let code = render::module(classes, options);
    check_syntax(&code)?;
    Ok(code)
}

/// Render a single request as a standalone snippet
pub fn generate_request(request: &Request, options: &GenerateOptions) -> Result<String> {
    let code = render::snippet(request, options);
    check_syntax(&code)?;
    Ok(code)
}

/// Parse captures, group them into classes and render the module
///
/// Captures no dialect recognizes are skipped. Returns `None` when nothing
/// could be parsed.
pub fn generate<'a, I>(captures: I, options: &GenerateOptions) -> Result<Option<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut synth = match &options.class_name {
        Some(name) => Synthesizer::with_class_name(name),
        None => Synthesizer::new(),
    };

    for (index, text) in captures.into_iter().enumerate() {
        if synth.add_text(text)?.is_none() {
            warn!(index, "Capture not recognized, skipping");
        }
    }

    if synth.is_empty() {
        return Ok(None);
    }
    generate_classes(&synth.into_classes(), options).map(Some)
}

/// Fail unless `code` parses as a Python module
#[cfg(feature = "syntax-check")]
pub fn check_syntax(code: &str) -> Result<()> {
    ruff_python_parser::parse_module(code)
        .map(|_| ())
        .map_err(|e| crate::errors::ReqforgeError::GeneratedSyntax(e.to_string()))
}

/// Syntax checking is compiled out without the `syntax-check` feature
#[cfg(not(feature = "syntax-check"))]
pub fn check_syntax(_code: &str) -> Result<()> {
    Ok(())
}
