//! Session portfolio store
//!
//! An ordered list of holdings. Entries are never edited in place: fixing a
//! share count is a remove followed by a new add.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::error::PortfolioError;

/// Shares per input unit (holdings are typed in thousands of shares)
pub const DEFAULT_SHARE_UNIT: u32 = 1000;

/// Smallest accepted input, in thousands (one share)
pub fn min_thousands() -> Decimal {
    Decimal::new(1, 3)
}

/// A single holding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioEntry {
    pub symbol: String,
    pub shares: Decimal,
}

/// Ordered collection of holdings with unique symbols
#[derive(Debug, Clone, Default)]
pub struct PortfolioStore {
    entries: Vec<PortfolioEntry>,
}

impl PortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a holding with an absolute share count.
    pub fn add(&mut self, symbol: &str, shares: Decimal) -> Result<&PortfolioEntry, PortfolioError> {
        if shares <= Decimal::ZERO {
            return Err(PortfolioError::InvalidShares(shares));
        }
        if self.contains(symbol) {
            return Err(PortfolioError::DuplicateSymbol(symbol.to_string()));
        }

        debug!("Adding {} x {} to portfolio", symbol, shares);
        self.entries.push(PortfolioEntry {
            symbol: symbol.to_string(),
            shares,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Append a holding given in thousands of shares, `shares = thousands * unit`.
    pub fn add_thousands(
        &mut self,
        symbol: &str,
        thousands: Decimal,
        unit: u32,
    ) -> Result<&PortfolioEntry, PortfolioError> {
        if thousands < min_thousands() {
            return Err(PortfolioError::InvalidShares(thousands));
        }
        let shares = thousands
            .checked_mul(Decimal::from(unit))
            .ok_or(PortfolioError::InvalidShares(thousands))?;
        self.add(symbol, shares)
    }

    /// Remove the entry at `index` (0-based).
    pub fn remove(&mut self, index: usize) -> Result<PortfolioEntry, PortfolioError> {
        if index >= self.entries.len() {
            return Err(PortfolioError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        debug!("Removed {} from portfolio", removed.symbol);
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.entries.iter().any(|e| e.symbol == symbol)
    }

    pub fn entries(&self) -> &[PortfolioEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
