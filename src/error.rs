//! Error handling for divcal
//!
//! Typed errors for the portfolio store and the dividend providers. The
//! application boundary (CLI, REPL, config loading) propagates with
//! `anyhow` for context chaining.

use rust_decimal::Decimal;
use thiserror::Error;

/// Input errors raised by the portfolio store and the symbol normalizer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortfolioError {
    #[error("{0} is already in the portfolio")]
    DuplicateSymbol(String),

    #[error("symbol cannot be empty")]
    EmptySymbol,

    #[error("invalid share amount {0}: minimum is 0.001 thousand (1 share)")]
    InvalidShares(Decimal),

    #[error("no entry at position {index} (portfolio has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Per-symbol failures while retrieving a dividend history
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request for {symbol} failed: {source}")]
    Http {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider returned status {status} for {symbol}")]
    Status { symbol: String, status: u16 },

    #[error("provider error for {symbol}: {code} - {description}")]
    Provider {
        symbol: String,
        code: String,
        description: String,
    },

    #[error("no data returned for {0}")]
    NotFound(String),

    #[error("could not parse dividends for {symbol}: {message}")]
    Parse { symbol: String, message: String },

    #[error("io error")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Whether another attempt could succeed (transport problems, throttling, 5xx)
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for application-level operations
pub type Result<T> = anyhow::Result<T>;
