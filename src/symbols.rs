//! Symbol normalization
//!
//! Turns what the user typed into a market-data lookup key. Local-market
//! codes are numeric-led (`2330`, `0050`, `00679B`) and get the configured
//! exchange suffix; anything already exchange-qualified or alphabetic
//! (`00679B.TWO`, `AAPL`) passes through untouched.

use crate::error::PortfolioError;

/// Suffix appended to bare local-market codes when none is configured
pub const DEFAULT_EXCHANGE_SUFFIX: &str = ".TW";

/// Normalize raw user input into a lookup key.
///
/// # Examples
/// ```
/// use divcal::symbols::normalize_symbol;
///
/// assert_eq!(normalize_symbol(" 0050 ", ".TW").unwrap(), "0050.TW");
/// assert_eq!(normalize_symbol("aapl", ".TW").unwrap(), "AAPL");
/// assert_eq!(normalize_symbol("00679b.two", ".TW").unwrap(), "00679B.TWO");
/// ```
pub fn normalize_symbol(raw: &str, exchange_suffix: &str) -> Result<String, PortfolioError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(PortfolioError::EmptySymbol);
    }

    if is_local_code(&symbol) {
        Ok(format!("{}{}", symbol, exchange_suffix))
    } else {
        Ok(symbol)
    }
}

/// A bare local code: no separator, alphanumeric only, leading digit.
fn is_local_code(symbol: &str) -> bool {
    !symbol.contains('.')
        && symbol.chars().all(|c| c.is_ascii_alphanumeric())
        && symbol.chars().next().is_some_and(|c| c.is_ascii_digit())
}
