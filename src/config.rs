//! CLI configuration for tokenmeter.
//!
//! A small optional TOML file (`tokenmeter.toml`) holding defaults that
//! would otherwise be repeated on every invocation. Everything in here can
//! be overridden by CLI flags or the `TOKENMETER_PRICING` environment
//! variable; precedence is handled in [`resolve_pricing_path`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TokenMeterError};

/// Environment variable overriding the pricing file location.
pub const PRICING_ENV_VAR: &str = "TOKENMETER_PRICING";

/// Top-level configuration for the tokenmeter CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Path to the pricing JSON file.
    pub pricing_file: PathBuf,
    /// Model used when `--model` is omitted.
    pub default_model: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pricing_file: PathBuf::from("pricing.json"),
            default_model: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TokenMeterError::io(format!("reading config from '{}'", path.display()), e)
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| TokenMeterError::config_with_source("failed to parse config", e))?;
        Ok(config)
    }

    /// Save config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TokenMeterError::config_with_source("failed to serialize config", e))?;
        std::fs::write(path, content).map_err(|e| {
            TokenMeterError::io(format!("writing config to '{}'", path.display()), e)
        })
    }
}

/// Discover the config file using standard search order:
/// 1. Explicit path (if provided)
/// 2. ./tokenmeter.toml
/// 3. ~/.tokenmeter.toml
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        if p.exists() {
            return Some(p.to_path_buf());
        }
        return None;
    }

    let local = PathBuf::from("tokenmeter.toml");
    if local.exists() {
        return Some(local);
    }

    if let Some(home) = std::env::var_os("HOME") {
        let home_config = PathBuf::from(home).join(".tokenmeter.toml");
        if home_config.exists() {
            return Some(home_config);
        }
    }

    None
}

/// Resolve the pricing file path: flag, then env var, then config file,
/// then the default `./pricing.json`.
pub fn resolve_pricing_path(flag: Option<&Path>, config: &Config) -> PathBuf {
    if let Some(p) = flag {
        return p.to_path_buf();
    }
    if let Some(env) = std::env::var_os(PRICING_ENV_VAR) {
        return PathBuf::from(env);
    }
    config.pricing_file.clone()
}
