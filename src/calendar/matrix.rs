use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::PayoutRecord;

/// Label of the synthetic row summing every symbol
pub const TOTALS_LABEL: &str = "Total";

/// One symbol's payouts per month of year plus the row total
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub symbol: String,
    /// January first
    pub months: [Decimal; 12],
    pub total: Decimal,
}

impl MatrixRow {
    fn new(symbol: String, months: [Decimal; 12]) -> Self {
        let total = months.iter().copied().sum();
        Self {
            symbol,
            months,
            total,
        }
    }

    /// Cell for a 1-based month
    pub fn month(&self, month: u32) -> Decimal {
        match month {
            1..=12 => self.months[(month - 1) as usize],
            _ => Decimal::ZERO,
        }
    }
}

/// Symbol x month payout table with a totals row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutMatrix {
    /// Sorted by symbol
    pub rows: Vec<MatrixRow>,
    pub totals: MatrixRow,
}

impl PayoutMatrix {
    pub fn grand_total(&self) -> Decimal {
        self.totals.total
    }

    /// Largest single symbol/month cell, used for colour scaling
    pub fn max_cell(&self) -> Decimal {
        self.rows
            .iter()
            .flat_map(|r| r.months.iter().copied())
            .max()
            .unwrap_or(Decimal::ZERO)
    }
}

/// Pivot payout records into a matrix. Returns `None` when there are no
/// records, so callers can't mistake an empty table for a zero income.
///
/// Sums are unchecked: `aggregate` only passes records whose per-month and
/// grand totals are known to fit in a `Decimal`.
pub fn build_matrix(records: &[PayoutRecord]) -> Option<PayoutMatrix> {
    if records.is_empty() {
        return None;
    }

    let mut by_symbol: BTreeMap<&str, [Decimal; 12]> = BTreeMap::new();
    for record in records.iter().filter(|r| (1..=12).contains(&r.month)) {
        let months = by_symbol
            .entry(record.symbol.as_str())
            .or_insert([Decimal::ZERO; 12]);
        months[(record.month - 1) as usize] += record.amount;
    }

    let rows: Vec<MatrixRow> = by_symbol
        .into_iter()
        .map(|(symbol, months)| MatrixRow::new(symbol.to_string(), months))
        .collect();

    let mut column_sums = [Decimal::ZERO; 12];
    for row in &rows {
        for (sum, cell) in column_sums.iter_mut().zip(row.months.iter()) {
            *sum += *cell;
        }
    }

    Some(PayoutMatrix {
        totals: MatrixRow::new(TOTALS_LABEL.to_string(), column_sums),
        rows,
    })
}
