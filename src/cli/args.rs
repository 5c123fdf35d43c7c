//! CLI argument definitions using clap

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::codegen::GenerateOptions;
use crate::errors::{ReqforgeError, Result};

/// reqforge - Turn captured browser requests into Python API clients
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "reqforge", version, about, long_about = None)]
pub struct Args {
    // =========================================================================
    // INPUT
    // =========================================================================

    /// Files holding one capture each: "Copy as fetch" or "Copy as PowerShell".
    /// Reads a single capture from stdin when omitted
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    // =========================================================================
    // GENERATED CODE
    // =========================================================================

    /// Generate async code (aiohttp, or httpx.AsyncClient with --httpx)
    #[arg(short = 'a', long = "async", action = ArgAction::SetTrue)]
    pub async_code: bool,

    /// Use httpx instead of requests/aiohttp
    #[arg(short = 'x', long = "httpx", action = ArgAction::SetTrue)]
    pub httpx: bool,

    /// Return response text instead of parsed JSON
    #[arg(short = 't', long = "text", action = ArgAction::SetTrue)]
    pub return_text: bool,

    /// Leave every header out of the generated code
    #[arg(long = "no-headers", action = ArgAction::SetTrue)]
    pub no_headers: bool,

    /// Leave every cookie out of the generated code
    #[arg(long = "no-cookies", action = ArgAction::SetTrue)]
    pub no_cookies: bool,

    /// Put every request into one class with this name
    #[arg(short = 'n', long = "class-name", value_name = "NAME")]
    pub class_name: Option<String>,

    /// Emit one standalone script per request instead of classes
    #[arg(long = "standalone", action = ArgAction::SetTrue)]
    pub standalone: bool,

    // =========================================================================
    // TROUBLESHOOTING
    // =========================================================================

    /// Output format for logs on stderr: json (JSON Lines) or text (default)
    #[arg(long = "log-format", value_name = "FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Debug logging
    #[arg(long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text output (default)
    #[default]
    Text,
    /// JSON Lines format for parsing
    Json,
}

impl Args {
    /// Reject values clap accepts but generation cannot use
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.class_name {
            if !name.chars().any(|c| c.is_ascii_alphanumeric()) {
                return Err(ReqforgeError::Argument(format!(
                    "--class-name '{}' has no letters or digits",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Switch flags given on the command line on over `defaults`
    pub fn apply_to(&self, defaults: GenerateOptions) -> GenerateOptions {
        GenerateOptions {
            sync: defaults.sync && !self.async_code,
            alternate_client: defaults.alternate_client || self.httpx,
            return_text: defaults.return_text || self.return_text,
            no_headers: defaults.no_headers || self.no_headers,
            no_cookies: defaults.no_cookies || self.no_cookies,
            class_name: self.class_name.clone().or(defaults.class_name),
        }
    }
}
