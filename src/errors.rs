//! Error types for reqforge

use thiserror::Error;

/// Main error type for reqforge
#[derive(Error, Debug)]
pub enum ReqforgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed URL: {0}")]
    MalformedUrl(String),

    #[error("Too many methods named '{name}' (max 999)")]
    NameExhaustion { name: String },

    #[error("Generated code is not valid Python: {0}")]
    GeneratedSyntax(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    Argument(String),
}

pub type Result<T> = std::result::Result<T, ReqforgeError>;
