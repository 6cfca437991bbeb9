//! Configuration file handling
//!
//! Settings live in `<config dir>/divcal/config.toml`. Every field is
//! optional; a missing file means defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::portfolio::DEFAULT_SHARE_UNIT;
use crate::symbols::DEFAULT_EXCHANGE_SUFFIX;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Suffix appended to bare numeric local codes (e.g. `2330` -> `2330.TW`)
    pub exchange_suffix: String,
    /// Shares per input unit when adding holdings
    pub share_unit: u32,
    /// Prefix used when printing money
    pub currency_symbol: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub yahoo_base_url: String,
    /// Reuse fetched histories for the rest of the UTC day in interactive mode
    pub cache_dividends: bool,
    pub history_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exchange_suffix: DEFAULT_EXCHANGE_SUFFIX.to_string(),
            share_unit: DEFAULT_SHARE_UNIT,
            currency_symbol: "$".to_string(),
            request_timeout_secs: 15,
            max_retries: 2,
            yahoo_base_url: "https://query1.finance.yahoo.com".to_string(),
            cache_dividends: false,
            history_file: None,
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.share_unit == 0 {
            anyhow::bail!("share_unit must be greater than zero");
        }
        Ok(config)
    }

    /// REPL history location, `~/.divcal/.history` unless configured
    pub fn history_path(&self) -> PathBuf {
        self.history_file.clone().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".divcal").join(".history")
        })
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join("divcal").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.exchange_suffix, ".TW");
        assert_eq!(config.share_unit, 1000);
        assert_eq!(config.request_timeout_secs, 15);
        assert!(!config.cache_dividends);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml("exchange_suffix = \".TWO\"\nmax_retries = 0\n").unwrap();
        assert_eq!(config.exchange_suffix, ".TWO");
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.share_unit, 1000);
        assert_eq!(config.currency_symbol, "$");
    }

    #[test]
    fn test_zero_share_unit_rejected() {
        assert!(Config::from_toml("share_unit = 0").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "currency_symbol = \"NT$\"").unwrap();
        writeln!(file, "cache_dividends = true").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.currency_symbol, "NT$");
        assert!(config.cache_dividends);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let err = Config::load(Some(Path::new("/nonexistent/divcal.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_history_path_override() {
        let config = Config {
            history_file: Some(PathBuf::from("/tmp/divcal-history")),
            ..Config::default()
        };
        assert_eq!(config.history_path(), PathBuf::from("/tmp/divcal-history"));
    }
}
