//! Offline dividend provider reading a local CSV file
//!
//! Expected columns: `symbol,date,amount`. Dates may be plain
//! (`2025-03-14`, `2025-03-14 09:00:00`) or carry an offset
//! (`2025-03-14T00:00:00+08:00`). The file is re-read on every fetch so
//! edits show up in the next analysis.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::{DividendEvent, DividendProvider, DividendSeries, RawDividendDate};
use crate::error::FetchError;

#[derive(Debug, Deserialize)]
struct CsvRow {
    symbol: String,
    date: String,
    amount: String,
}

pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_series(&self, symbol: &str) -> Result<DividendSeries, FetchError> {
        let parse_err = |message: String| FetchError::Parse {
            symbol: symbol.to_string(),
            message,
        };

        let file = std::fs::File::open(&self.path)?;
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

        let mut series = Vec::new();
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| parse_err(format!("row {}: {}", line + 1, e)))?;
            if !row.symbol.eq_ignore_ascii_case(symbol) {
                continue;
            }

            let date = parse_date(&row.date)
                .ok_or_else(|| parse_err(format!("row {}: invalid date '{}'", line + 1, row.date)))?;
            let amount = Decimal::from_str(&row.amount).map_err(|e| {
                parse_err(format!("row {}: invalid amount '{}': {}", line + 1, row.amount, e))
            })?;
            if amount < Decimal::ZERO {
                return Err(parse_err(format!("row {}: negative amount {}", line + 1, amount)));
            }

            series.push(DividendEvent { date, amount });
        }

        series.sort_by_key(|e| e.date.to_utc());
        Ok(series)
    }
}

impl DividendProvider for CsvProvider {
    async fn fetch_dividends(&self, symbol: &str) -> Result<DividendSeries, FetchError> {
        debug!("Reading dividends for {} from {}", symbol, self.path.display());
        self.read_series(symbol)
    }
}

/// Parse a provider date, keeping the offset when one is present.
pub fn parse_date(s: &str) -> Option<RawDividendDate> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(s) {
        return Some(RawDividendDate::Aware(aware));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(RawDividendDate::Naive(naive));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(RawDividendDate::Naive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(matches!(parse_date("2025-03-14"), Some(RawDividendDate::Naive(_))));
        assert!(matches!(
            parse_date("2025-03-14 09:30:00"),
            Some(RawDividendDate::Naive(_))
        ));
        assert!(matches!(
            parse_date("2025-03-14T00:00:00+08:00"),
            Some(RawDividendDate::Aware(_))
        ));
        assert!(parse_date("14/03/2025").is_none());
    }

    #[tokio::test]
    async fn test_reads_only_requested_symbol() {
        let file = write_csv(
            "symbol,date,amount\n\
             0056.TW,2025-07-16,0.7\n\
             AAPL,2025-08-11T00:00:00-04:00,0.26\n\
             0056.TW,2025-04-16,0.5\n",
        );
        let provider = CsvProvider::new(file.path());

        let series = provider.fetch_dividends("0056.TW").await.unwrap();
        assert_eq!(series.len(), 2);
        // Sorted chronologically
        assert_eq!(series[0].amount, dec!(0.5));
        assert_eq!(series[1].amount, dec!(0.7));

        let apple = provider.fetch_dividends("AAPL").await.unwrap();
        assert!(matches!(apple[0].date, RawDividendDate::Aware(_)));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_empty() {
        let file = write_csv("symbol,date,amount\nAAPL,2025-08-11,0.26\n");
        let provider = CsvProvider::new(file.path());
        assert!(provider.fetch_dividends("MSFT").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_row_is_parse_error_for_that_symbol() {
        let file = write_csv("symbol,date,amount\nAAPL,yesterday,0.26\nMSFT,2025-08-14,0.83\n");
        let provider = CsvProvider::new(file.path());

        assert!(matches!(
            provider.fetch_dividends("AAPL").await,
            Err(FetchError::Parse { .. })
        ));
        assert_eq!(provider.fetch_dividends("MSFT").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let provider = CsvProvider::new("/nonexistent/divcal/dividends.csv");
        assert!(matches!(
            provider.fetch_dividends("AAPL").await,
            Err(FetchError::Io(_))
        ));
    }
}
