//! Dividend calendar aggregation
//!
//! Turns per-symbol dividend histories into one symbol x month payout
//! matrix over the trailing twelve months:
//!
//! 1. every event date is put on UTC (naive dates are read as UTC)
//! 2. events outside `[now - 12 months, now]` are dropped
//! 3. each remaining event pays `amount * shares`
//! 4. payouts are bucketed by month of year, ignoring the year
//!
//! Bucketing by month of year means a window that touches the same calendar
//! month twice (e.g. two January ex-dates twelve months apart) sums both
//! into one cell.

pub mod matrix;

pub use matrix::{build_matrix, MatrixRow, PayoutMatrix};

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::dividends::{DividendProvider, DividendSeries};
use crate::portfolio::{PortfolioEntry, PortfolioStore};

/// Trailing twelve-month window, fixed for one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    pub fn trailing_year(now: DateTime<Utc>) -> Self {
        let start = now
            .checked_sub_months(Months::new(12))
            .unwrap_or_else(|| now - Duration::days(365));
        Self { start, end: now }
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Cash attributable to one holding for one dividend event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutRecord {
    pub symbol: String,
    /// Month of year, 1-12
    pub month: u32,
    pub amount: Decimal,
    pub pay_date: DateTime<Utc>,
}

/// Per-symbol outcome worth telling the user about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisNotice {
    /// The provider failed; the symbol contributes nothing
    FetchFailed { symbol: String, message: String },
    /// The provider has no dividend history at all
    NoHistory { symbol: String },
    /// History exists but nothing falls inside the window
    NoEventsInWindow { symbol: String },
    /// Payouts exceed what the calendar totals can hold; the symbol is skipped
    AmountOverflow { symbol: String },
}

impl AnalysisNotice {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            AnalysisNotice::FetchFailed { .. } | AnalysisNotice::AmountOverflow { .. }
        )
    }

    pub fn message(&self) -> String {
        match self {
            AnalysisNotice::FetchFailed { symbol, message } => {
                format!("Failed to read {}: {}", symbol, message)
            }
            AnalysisNotice::NoHistory { symbol } => {
                format!("{} has no dividend records", symbol)
            }
            AnalysisNotice::NoEventsInWindow { symbol } => {
                format!("{} paid no dividends in the last 12 months", symbol)
            }
            AnalysisNotice::AmountOverflow { symbol } => {
                format!("{} payouts are too large to total", symbol)
            }
        }
    }
}

/// Progress events emitted while the portfolio is processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarProgress {
    Fetching {
        symbol: String,
        index: usize,
        total: usize,
    },
    Done {
        completed: usize,
        total: usize,
    },
}

/// Result of one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct CalendarReport {
    pub window: ReportWindow,
    pub records: Vec<PayoutRecord>,
    /// `None` when no symbol produced an in-window payout
    pub matrix: Option<PayoutMatrix>,
    pub annual_total: Decimal,
    pub average_monthly: Decimal,
    pub notices: Vec<AnalysisNotice>,
}

impl CalendarReport {
    pub fn has_data(&self) -> bool {
        self.matrix.is_some()
    }

    /// Income per month of year, January first
    pub fn monthly_totals(&self) -> [Decimal; 12] {
        self.matrix
            .as_ref()
            .map(|m| m.totals.months)
            .unwrap_or([Decimal::ZERO; 12])
    }
}

/// Scale the in-window events of one holding into payout records.
///
/// Returns `None` when `amount * shares` does not fit in a `Decimal`.
pub fn payout_records(
    entry: &PortfolioEntry,
    series: &DividendSeries,
    window: &ReportWindow,
) -> Option<Vec<PayoutRecord>> {
    let mut records = Vec::new();
    for event in series {
        let pay_date = event.date.to_utc();
        if !window.contains(pay_date) {
            continue;
        }
        records.push(PayoutRecord {
            symbol: entry.symbol.clone(),
            month: pay_date.month(),
            amount: event.amount.checked_mul(entry.shares)?,
            pay_date,
        });
    }
    Some(records)
}

/// Running per-month and grand totals of the records accepted so far.
///
/// Every amount is non-negative, so once these fit every cell, row total
/// and column total of the final matrix fits as well.
#[derive(Debug, Default)]
struct RunningTotals {
    months: [Decimal; 12],
    grand: Decimal,
}

impl RunningTotals {
    /// Add `payouts` if none of the totals overflow; otherwise leave the
    /// totals untouched and return `false`.
    fn try_add(&mut self, payouts: &[PayoutRecord]) -> bool {
        let mut months = self.months;
        let mut grand = self.grand;
        for record in payouts.iter().filter(|r| (1..=12).contains(&r.month)) {
            let cell = &mut months[(record.month - 1) as usize];
            match (cell.checked_add(record.amount), grand.checked_add(record.amount)) {
                (Some(m), Some(g)) => {
                    *cell = m;
                    grand = g;
                }
                _ => return false,
            }
        }
        self.months = months;
        self.grand = grand;
        true
    }
}

/// Build the report from already-collected records and notices.
pub fn summarize(
    window: ReportWindow,
    records: Vec<PayoutRecord>,
    notices: Vec<AnalysisNotice>,
) -> CalendarReport {
    let matrix = build_matrix(&records);
    let annual_total = matrix
        .as_ref()
        .map(PayoutMatrix::grand_total)
        .unwrap_or(Decimal::ZERO);
    let average_monthly = annual_total / Decimal::from(12);

    CalendarReport {
        window,
        records,
        matrix,
        annual_total,
        average_monthly,
        notices,
    }
}

/// Run one analysis over the whole portfolio.
///
/// Holdings are processed one at a time in insertion order. A failing
/// symbol becomes a notice and the rest of the portfolio is still
/// aggregated, as does a symbol whose payouts would overflow the totals.
/// An empty portfolio makes no provider calls.
pub async fn aggregate<P, F>(
    portfolio: &PortfolioStore,
    provider: &P,
    now: DateTime<Utc>,
    mut on_progress: F,
) -> CalendarReport
where
    P: DividendProvider,
    F: FnMut(CalendarProgress),
{
    let window = ReportWindow::trailing_year(now);
    let total = portfolio.len();
    info!(
        "Building dividend calendar for {} holdings ({} to {})",
        total,
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d")
    );

    let mut records = Vec::new();
    let mut notices = Vec::new();
    let mut totals = RunningTotals::default();

    for (index, entry) in portfolio.entries().iter().enumerate() {
        on_progress(CalendarProgress::Fetching {
            symbol: entry.symbol.clone(),
            index,
            total,
        });

        match provider.fetch_dividends(&entry.symbol).await {
            Ok(series) if series.is_empty() => {
                debug!("{} has no dividend history", entry.symbol);
                notices.push(AnalysisNotice::NoHistory {
                    symbol: entry.symbol.clone(),
                });
            }
            Ok(series) => match payout_records(entry, &series, &window) {
                Some(payouts) if totals.try_add(&payouts) => {
                    debug!(
                        "{}: {} of {} events in window",
                        entry.symbol,
                        payouts.len(),
                        series.len()
                    );
                    if payouts.is_empty() {
                        notices.push(AnalysisNotice::NoEventsInWindow {
                            symbol: entry.symbol.clone(),
                        });
                    }
                    records.extend(payouts);
                }
                _ => {
                    warn!("Skipping {}: payouts overflow the calendar totals", entry.symbol);
                    notices.push(AnalysisNotice::AmountOverflow {
                        symbol: entry.symbol.clone(),
                    });
                }
            },
            Err(e) => {
                warn!("Skipping {}: {}", entry.symbol, e);
                notices.push(AnalysisNotice::FetchFailed {
                    symbol: entry.symbol.clone(),
                    message: e.to_string(),
                });
            }
        }

        on_progress(CalendarProgress::Done {
            completed: index + 1,
            total,
        });
    }

    summarize(window, records, notices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dividends::{DividendEvent, RawDividendDate};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 19, 12, 0, 0).unwrap()
    }

    fn naive_event(y: i32, m: u32, d: u32, amount: Decimal) -> DividendEvent {
        DividendEvent {
            date: RawDividendDate::Naive(
                chrono::NaiveDate::from_ymd_opt(y, m, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            ),
            amount,
        }
    }

    #[test]
    fn test_window_is_twelve_calendar_months() {
        let window = ReportWindow::trailing_year(now());
        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 10, 19, 12, 0, 0).unwrap());
        assert_eq!(window.end, now());
    }

    #[test]
    fn test_window_clamps_month_end() {
        let leap = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        let window = ReportWindow::trailing_year(leap);
        assert_eq!(window.start, Utc.with_ymd_and_hms(2023, 2, 28, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_window_bounds_inclusive() {
        let window = ReportWindow::trailing_year(now());
        assert!(window.contains(window.start));
        assert!(window.contains(window.end));
        assert!(!window.contains(window.start - Duration::seconds(1)));
        assert!(!window.contains(window.end + Duration::seconds(1)));
    }

    #[test]
    fn test_payout_records_scale_and_filter() {
        let entry = PortfolioEntry {
            symbol: "0056.TW".to_string(),
            shares: dec!(2000),
        };
        let series = vec![
            naive_event(2024, 7, 16, dec!(1.0)), // before window
            naive_event(2025, 1, 16, dec!(1.07)),
            naive_event(2025, 7, 16, dec!(0.87)),
        ];

        let records =
            payout_records(&entry, &series, &ReportWindow::trailing_year(now())).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].month, 1);
        assert_eq!(records[0].amount, dec!(2140));
        assert_eq!(records[1].month, 7);
        assert_eq!(records[1].amount, dec!(1740));
    }

    #[test]
    fn test_payout_records_overflow_is_none() {
        let entry = PortfolioEntry {
            symbol: "2330.TW".to_string(),
            shares: Decimal::MAX,
        };
        let series = vec![naive_event(2025, 7, 16, dec!(2))];
        assert!(payout_records(&entry, &series, &ReportWindow::trailing_year(now())).is_none());
    }

    #[test]
    fn test_running_totals_reject_overflow_atomically() {
        let mut totals = RunningTotals::default();
        let record = |month: u32, amount: Decimal| PayoutRecord {
            symbol: "X".to_string(),
            month,
            amount,
            pay_date: now(),
        };
        assert!(totals.try_add(&[record(1, dec!(5))]));
        assert!(!totals.try_add(&[record(2, dec!(1)), record(3, Decimal::MAX)]));
        assert_eq!(totals.grand, dec!(5));
        assert_eq!(totals.months[1], Decimal::ZERO);
    }

    #[test]
    fn test_notice_messages_name_symbol() {
        let notice = AnalysisNotice::FetchFailed {
            symbol: "NOPE.TW".to_string(),
            message: "no data returned for NOPE.TW".to_string(),
        };
        assert!(notice.is_error());
        assert!(notice.message().starts_with("Failed to read NOPE.TW"));

        let notice = AnalysisNotice::NoHistory {
            symbol: "BRK-B".to_string(),
        };
        assert!(!notice.is_error());
        assert_eq!(notice.message(), "BRK-B has no dividend records");
    }

    #[test]
    fn test_summarize_empty_has_no_matrix() {
        let report = summarize(ReportWindow::trailing_year(now()), Vec::new(), Vec::new());
        assert!(!report.has_data());
        assert_eq!(report.annual_total, Decimal::ZERO);
        assert_eq!(report.average_monthly, Decimal::ZERO);
        assert_eq!(report.monthly_totals(), [Decimal::ZERO; 12]);
    }
}
