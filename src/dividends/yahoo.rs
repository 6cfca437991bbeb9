use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{DividendEvent, DividendProvider, DividendSeries, RawDividendDate};
use crate::config::Config;
use crate::error::FetchError;

/// Yahoo Finance chart response (dividend events only)
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    events: Option<Events>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    /// Exchange offset from UTC in seconds
    gmtoffset: Option<i32>,
    #[serde(rename = "exchangeTimezoneName")]
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Events {
    dividends: Option<HashMap<String, YahooDividend>>,
}

#[derive(Debug, Deserialize)]
struct YahooDividend {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Dividend provider backed by the Yahoo Finance chart API
pub struct YahooProvider {
    client: Client,
    base_url: String,
    max_retries: u32,
}

impl YahooProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; DivcalBot/1.0)")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.yahoo_base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1=0&period2={}&interval=1d&events=div",
            self.base_url,
            symbol,
            Utc::now().timestamp()
        )
    }

    async fn fetch_once(&self, symbol: &str) -> Result<DividendSeries, FetchError> {
        let url = self.chart_url(symbol);
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                symbol: symbol.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| FetchError::Http {
            symbol: symbol.to_string(),
            source,
        })?;

        if !status.is_success() {
            // Unknown symbols come back as 404 with a chart.error payload
            if let Ok(data) = serde_json::from_str::<YahooChartResponse>(&body) {
                if let Some(error) = data.chart.error {
                    return Err(FetchError::Provider {
                        symbol: symbol.to_string(),
                        code: error.code,
                        description: error.description,
                    });
                }
            }
            return Err(FetchError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        parse_dividend_response(symbol, &body)
    }
}

impl DividendProvider for YahooProvider {
    async fn fetch_dividends(&self, symbol: &str) -> Result<DividendSeries, FetchError> {
        info!("Fetching dividend history for {} from Yahoo Finance", symbol);

        let mut attempt = 0;
        loop {
            match self.fetch_once(symbol).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "Attempt {} for {} failed ({}), retrying",
                        attempt, symbol, e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
                }
                result => return result,
            }
        }
    }
}

/// Parse a chart response body into a dividend series.
///
/// Dates are attached to the exchange's UTC offset when Yahoo reports one,
/// otherwise they stay naive.
pub fn parse_dividend_response(symbol: &str, body: &str) -> Result<DividendSeries, FetchError> {
    let parse_err = |message: String| FetchError::Parse {
        symbol: symbol.to_string(),
        message,
    };

    let data: YahooChartResponse =
        serde_json::from_str(body).map_err(|e| parse_err(e.to_string()))?;

    if let Some(error) = data.chart.error {
        return Err(FetchError::Provider {
            symbol: symbol.to_string(),
            code: error.code,
            description: error.description,
        });
    }

    let result = data
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| FetchError::NotFound(symbol.to_string()))?;

    let offset = result.meta.gmtoffset.and_then(FixedOffset::east_opt);
    if let Some(tz) = &result.meta.exchange_timezone_name {
        debug!("{} trades in {} (offset {:?})", symbol, tz, offset);
    }

    let dividends = match result.events.and_then(|e| e.dividends) {
        Some(d) => d,
        None => return Ok(Vec::new()),
    };

    let mut series = Vec::with_capacity(dividends.len());
    for entry in dividends.into_values() {
        let utc = DateTime::from_timestamp(entry.date, 0)
            .ok_or_else(|| parse_err(format!("invalid timestamp {}", entry.date)))?;

        let date = match offset {
            Some(offset) => RawDividendDate::Aware(utc.with_timezone(&offset)),
            None => RawDividendDate::Naive(utc.naive_utc()),
        };

        let amount = Decimal::from_f64(entry.amount)
            .ok_or_else(|| parse_err(format!("invalid amount {}", entry.amount)))?;
        if amount < Decimal::ZERO {
            warn!("Skipping negative dividend {} for {}", amount, symbol);
            continue;
        }

        series.push(DividendEvent { date, amount });
    }

    series.sort_by_key(|e| e.date.to_utc());
    debug!("Parsed {} dividend events for {}", series.len(), symbol);
    Ok(series)
}
