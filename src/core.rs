//! Command-line driver
//!
//! Reads captures from files or stdin, converts them and writes the generated
//! Python to stdout. Problems with individual inputs are reported on stderr
//! and skipped.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::capture::parse_input;
use crate::cli::{Args, LogFormat};
use crate::codegen::{generate_classes, generate_request, GenerateOptions};
use crate::config::Config;
use crate::request::Request;
use crate::status::ExitStatus;
use crate::synth::Synthesizer;

const STDIN_LABEL: &str = "<stdin>";

/// One input unit: a whole file, or all of stdin
#[derive(Debug)]
struct Input {
    label: String,
    text: String,
}

/// Main entry point for the CLI
pub fn run(args: Vec<String>) -> ExitStatus {
    let parsed = match Args::try_parse_from(&args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    init_logging(parsed.debug, parsed.log_format.unwrap_or_default());

    if let Err(e) = parsed.validate() {
        eprintln!("error: {}", e);
        return ExitStatus::Error;
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {}", e);
            Config::default()
        }
    };
    debug!(config_dir = %config.config_dir.display(), "Loaded config");

    let options = parsed.apply_to(config.generate_options());
    let inputs = read_inputs(&parsed);

    let requests: Vec<(String, Request)> = inputs
        .into_iter()
        .filter_map(|input| match parse_input(&input.text) {
            Some(request) => Some((input.label, request)),
            None => {
                eprintln!("{}: not a fetch or PowerShell capture, skipping", input.label);
                None
            }
        })
        .collect();

    let result = if parsed.standalone {
        standalone(&requests, &options)
    } else {
        classes(requests, &options)
    };

    match result {
        Ok((code, count)) => {
            if count > 0 {
                print!("{}", code);
            }
            ExitStatus::from_generated(count)
        }
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitStatus::Error
        }
    }
}

/// One module with a class per site
fn classes(requests: Vec<(String, Request)>, options: &GenerateOptions) -> anyhow::Result<(String, usize)> {
    let mut synth = match &options.class_name {
        Some(name) => Synthesizer::with_class_name(name),
        None => Synthesizer::new(),
    };

    let mut count = 0;
    for (label, request) in requests {
        let method = synth
            .add_request(request)
            .with_context(|| format!("Failed to add request from {}", label))?;
        info!(input = %label, class = %method.class_name(), method = %method.name, "Converted capture");
        count += 1;
    }

    if synth.is_empty() {
        return Ok((String::new(), 0));
    }
    let code = generate_classes(&synth.into_classes(), options)?;
    Ok((code, count))
}

/// A standalone script per request, each headed by its input label
fn standalone(requests: &[(String, Request)], options: &GenerateOptions) -> anyhow::Result<(String, usize)> {
    let mut scripts = Vec::with_capacity(requests.len());
    for (label, request) in requests {
        let code = generate_request(request, options)
            .with_context(|| format!("Failed to generate code for {}", label))?;
        scripts.push(format!("# {}\n{}", label.replace('\n', " "), code));
    }
    Ok((scripts.join("\n\n"), scripts.len()))
}

fn read_inputs(args: &Args) -> Vec<Input> {
    if args.files.is_empty() {
        return match read_stdin() {
            Ok(text) => vec![Input {
                label: STDIN_LABEL.to_string(),
                text,
            }],
            Err(e) => {
                eprintln!("error: {:#}", e);
                Vec::new()
            }
        };
    }

    args.files
        .iter()
        .filter_map(|path| match read_file(path) {
            Ok(text) => Some(Input {
                label: path.display().to_string(),
                text,
            }),
            Err(e) => {
                eprintln!("error: {:#}", e);
                None
            }
        })
        .collect()
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(text)
}

/// Structured logs on stderr; `RUST_LOG` applies unless `--debug` is given
fn init_logging(debug: bool, format: LogFormat) {
    let filter = if debug {
        EnvFilter::new("reqforge=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reqforge=warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_err() {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}
