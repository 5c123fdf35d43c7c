//! Config file handling

use std::path::{Path, PathBuf};

use crate::codegen::GenerateOptions;
use crate::errors::{ReqforgeError, Result};

/// Overrides the directory `config.toml` is read from
pub const CONFIG_DIR_ENV: &str = "REQFORGE_CONFIG_DIR";

/// Defaults from the `[defaults]` table of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub config_dir: PathBuf,
    pub async_code: bool,
    pub httpx: bool,
    pub return_text: bool,
    pub no_headers: bool,
    pub no_cookies: bool,
    pub class_name: Option<String>,
}

impl Config {
    /// Load configuration from the config directory
    ///
    /// A missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_dir())
    }

    pub fn load_from(config_dir: &Path) -> Result<Self> {
        let config_file = config_dir.join("config.toml");
        if !config_file.exists() {
            return Ok(Self {
                config_dir: config_dir.to_path_buf(),
                ..Self::default()
            });
        }

        let content = std::fs::read_to_string(&config_file)
            .map_err(|e| ReqforgeError::Config(format!("Failed to read config: {}", e)))?;
        let mut config = Self::parse(&content)?;
        config.config_dir = config_dir.to_path_buf();
        Ok(config)
    }

    /// Parse the contents of a `config.toml`
    pub fn parse(content: &str) -> Result<Self> {
        let toml_value: toml::Value = toml::from_str(content)
            .map_err(|e| ReqforgeError::Config(format!("Invalid config TOML: {}", e)))?;

        let defaults = toml_value.get("defaults");
        let flag = |key: &str| -> Result<bool> {
            match defaults.and_then(|d| d.get(key)) {
                None => Ok(false),
                Some(v) => v
                    .as_bool()
                    .ok_or_else(|| ReqforgeError::Config(format!("defaults.{} must be a boolean", key))),
            }
        };

        let class_name = match defaults.and_then(|d| d.get("class_name")) {
            None => None,
            Some(v) => Some(
                v.as_str()
                    .ok_or_else(|| ReqforgeError::Config("defaults.class_name must be a string".to_string()))?
                    .to_string(),
            ),
        };

        Ok(Self {
            config_dir: PathBuf::new(),
            async_code: flag("async")?,
            httpx: flag("httpx")?,
            return_text: flag("return_text")?,
            no_headers: flag("no_headers")?,
            no_cookies: flag("no_cookies")?,
            class_name,
        })
    }

    /// Generation options before command-line flags are applied
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            sync: !self.async_code,
            alternate_client: self.httpx,
            return_text: self.return_text,
            no_headers: self.no_headers,
            no_cookies: self.no_cookies,
            class_name: self.class_name.clone(),
        }
    }

    /// `$REQFORGE_CONFIG_DIR`, else `<config_dir>/reqforge`
    pub fn default_config_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        dirs::config_dir()
            .map(|p| p.join("reqforge"))
            .unwrap_or_else(|| PathBuf::from(".reqforge"))
    }
}
