//! reqforge library interface
//!
//! Converts requests captured with a browser's "Copy as fetch" or
//! "Copy as PowerShell" into Python API client code.
//!
//! # Module Organization
//!
//! - [`capture`] - Dialect parsers producing a [`request::Request`]
//! - [`synth`] - Groups requests into classes and methods
//! - [`codegen`] - Renders classes or single requests as Python
//! - [`errors`] - Error types (ReqforgeError, Result)
//! - [`status`] - Exit status codes (ExitStatus)
//! - [`core`] - Command-line driver

pub mod capture;
pub mod case;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod cookies;
pub mod core;
pub mod errors;
pub mod request;
pub mod status;
pub mod strings;
pub mod synth;

pub use capture::{parse_fetch, parse_input, parse_powershell};
pub use codegen::{generate, generate_class, generate_request, GenerateOptions};
pub use errors::{ReqforgeError, Result};
pub use synth::{Class, Method, Synthesizer};
