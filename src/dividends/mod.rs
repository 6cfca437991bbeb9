// Dividends module - provider seam and the raw series it returns

pub mod cache;
pub mod csv_file;
pub mod yahoo;

pub use cache::CachedProvider;
pub use csv_file::CsvProvider;
pub use yahoo::YahooProvider;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::error::FetchError;

/// Timestamp as delivered by a provider.
///
/// Providers disagree on whether dates carry an offset, so the raw value is
/// kept until [`RawDividendDate::to_utc`] puts everything on one clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDividendDate {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl RawDividendDate {
    /// Naive values are read as UTC, aware values are converted to UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            RawDividendDate::Naive(naive) => Utc.from_utc_datetime(naive),
            RawDividendDate::Aware(aware) => aware.with_timezone(&Utc),
        }
    }
}

/// One distribution: per-share amount on its ex-date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DividendEvent {
    pub date: RawDividendDate,
    pub amount: Decimal,
}

/// Chronological dividend history of one symbol
pub type DividendSeries = Vec<DividendEvent>;

/// Source of dividend histories.
///
/// Implementations return the full history they know about; windowing is
/// done by the calendar. An unknown symbol may be an error or an empty series
/// depending on the provider.
#[allow(async_fn_in_trait)]
pub trait DividendProvider {
    async fn fetch_dividends(&self, symbol: &str) -> Result<DividendSeries, FetchError>;
}
