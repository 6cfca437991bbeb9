use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use super::{DividendProvider, DividendSeries};
use crate::error::FetchError;

type CacheKey = (String, NaiveDate);

/// Day-scoped cache in front of another provider.
///
/// Entries are keyed by symbol and UTC calendar day, so a new day always
/// reaches the provider again. Failures are not cached.
pub struct CachedProvider<P> {
    inner: P,
    cache: Arc<Mutex<HashMap<CacheKey, DividendSeries>>>,
}

impl<P: DividendProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, DividendSeries>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch through the cache for an explicit day
    pub async fn fetch_for_day(
        &self,
        symbol: &str,
        day: NaiveDate,
    ) -> Result<DividendSeries, FetchError> {
        let key = (symbol.to_string(), day);
        if let Some(series) = self.lock().get(&key) {
            debug!("Using cached dividends for {} ({})", symbol, day);
            return Ok(series.clone());
        }

        let series = self.inner.fetch_dividends(symbol).await?;
        self.lock().insert(key, series.clone());
        Ok(series)
    }

    pub fn clear_cache(&self) {
        self.lock().clear();
        info!("Dividend cache cleared");
    }

    pub fn cache_size(&self) -> usize {
        self.lock().len()
    }
}

impl<P: DividendProvider> DividendProvider for CachedProvider<P> {
    async fn fetch_dividends(&self, symbol: &str) -> Result<DividendSeries, FetchError> {
        self.fetch_for_day(symbol, Utc::now().date_naive()).await
    }
}
