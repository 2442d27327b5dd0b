use super::cache::{CoordinateKey, SeriesCache};
use crate::error::Result;
use crate::models::{ClimateSeries, GeoCoordinate};
use async_trait::async_trait;
use std::sync::Arc;

/// Something that can download a daily history for a coordinate.
#[async_trait]
pub trait ClimateFetcher: Send + Sync {
    async fn fetch_series(&self, coordinate: GeoCoordinate) -> Result<ClimateSeries>;
}

/// Fetch-and-cache boundary in front of a `ClimateFetcher`.
///
/// The fetcher is called with the rounded coordinate, at most once per key
/// for as long as this source lives (concurrent misses for the same key may
/// both fetch; the first result stored is the one kept). Failed fetches are
/// not cached.
pub struct ClimateDataSource<F> {
    fetcher: F,
    cache: SeriesCache,
}

impl<F: ClimateFetcher> ClimateDataSource<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: SeriesCache::new(),
        }
    }

    pub async fn fetch(&self, coordinate: GeoCoordinate) -> Result<Arc<ClimateSeries>> {
        let key = CoordinateKey::from(coordinate);

        if let Some(series) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {}", key);
            return Ok(series);
        }

        let series = self.fetcher.fetch_series(key.coordinate()).await?;
        Ok(self.cache.put(key, series))
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::WeatherOddsError;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-memory fetcher that counts calls and records the coordinates it saw.
    pub(crate) struct CountingFetcher {
        pub calls: Arc<AtomicUsize>,
        pub seen: Arc<Mutex<Vec<GeoCoordinate>>>,
        series: ClimateSeries,
        fail_first: bool,
    }

    impl CountingFetcher {
        pub(crate) fn new(series: ClimateSeries) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                seen: Arc::new(Mutex::new(Vec::new())),
                series,
                fail_first: false,
            }
        }

        pub(crate) fn failing_once(series: ClimateSeries) -> Self {
            Self {
                fail_first: true,
                ..Self::new(series)
            }
        }
    }

    #[async_trait]
    impl ClimateFetcher for CountingFetcher {
        async fn fetch_series(&self, coordinate: GeoCoordinate) -> Result<ClimateSeries> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(coordinate);
            // Let other in-flight fetches run, as a network call would
            tokio::task::yield_now().await;
            if self.fail_first && call == 0 {
                return Err(WeatherOddsError::Network("connection reset".into()));
            }
            Ok(self.series.clone())
        }
    }

    fn sample_series() -> ClimateSeries {
        let mut series = ClimateSeries::default();
        series
            .max_temp_c
            .insert(NaiveDate::from_ymd_opt(1990, 7, 15).unwrap(), 41.0);
        series
    }

    #[tokio::test]
    async fn second_query_hits_cache() {
        let fetcher = CountingFetcher::new(sample_series());
        let calls = Arc::clone(&fetcher.calls);
        let source = ClimateDataSource::new(fetcher);

        let dubai = GeoCoordinate::new(25.2048, 55.2708);
        let first = source.fetch(dubai).await.unwrap();
        let second = source.fetch(dubai).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.cache().len(), 1);
    }

    #[tokio::test]
    async fn nearby_coordinates_share_an_entry() {
        let fetcher = CountingFetcher::new(sample_series());
        let calls = Arc::clone(&fetcher.calls);
        let seen = Arc::clone(&fetcher.seen);
        let source = ClimateDataSource::new(fetcher);

        source
            .fetch(GeoCoordinate::new(25.20481, 55.27079))
            .await
            .unwrap();
        source
            .fetch(GeoCoordinate::new(25.20479, 55.27082))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // The fetcher sees the rounded coordinate
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            &[GeoCoordinate::new(25.2048, 55.2708)]
        );
    }

    #[tokio::test]
    async fn distinct_coordinates_fetch_separately() {
        let fetcher = CountingFetcher::new(sample_series());
        let calls = Arc::clone(&fetcher.calls);
        let source = ClimateDataSource::new(fetcher);

        source.fetch(GeoCoordinate::new(25.2048, 55.2708)).await.unwrap();
        source.fetch(GeoCoordinate::new(51.5072, -0.1276)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(source.cache().len(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let fetcher = CountingFetcher::failing_once(sample_series());
        let calls = Arc::clone(&fetcher.calls);
        let source = ClimateDataSource::new(fetcher);
        let coord = GeoCoordinate::new(64.1466, -21.9426);

        let err = source.fetch(coord).await.unwrap_err();
        assert!(matches!(err, WeatherOddsError::Network(_)));
        assert!(source.cache().is_empty());

        let series = source.fetch(coord).await.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_misses_return_same_data() {
        let fetcher = CountingFetcher::new(sample_series());
        let calls = Arc::clone(&fetcher.calls);
        let source = ClimateDataSource::new(fetcher);
        let coord = GeoCoordinate::new(35.6762, 139.6503);

        let (a, b) = tokio::join!(source.fetch(coord), source.fetch(coord));
        let (a, b) = (a.unwrap(), b.unwrap());

        // Both missed and fetched; the second store keeps the first series
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.cache().len(), 1);

        let c = source.fetch(coord).await.unwrap();
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
