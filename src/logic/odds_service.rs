use super::exceedance::compute_odds;
use crate::datasources::{ClimateDataSource, ClimateFetcher};
use crate::error::Result;
use crate::models::{GeoCoordinate, OddsReport, ThresholdSet};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OddsQuery {
    pub coordinate: GeoCoordinate,
    pub date: NaiveDate,
    pub thresholds: ThresholdSet,
}

/// Runs odds queries against a cached climate data source.
///
/// The series cache lives as long as the service does.
pub struct OddsService<F> {
    source: ClimateDataSource<F>,
}

impl<F: ClimateFetcher> OddsService<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            source: ClimateDataSource::new(fetcher),
        }
    }

    pub async fn query(&self, query: &OddsQuery) -> Result<OddsReport> {
        let series = self.source.fetch(query.coordinate).await?;
        Ok(compute_odds(&series, query.date, &query.thresholds))
    }

    /// Same location and thresholds, several dates. The series is fetched once.
    pub async fn query_dates(
        &self,
        coordinate: GeoCoordinate,
        dates: &[NaiveDate],
        thresholds: ThresholdSet,
    ) -> Result<Vec<(OddsQuery, OddsReport)>> {
        let series = self.source.fetch(coordinate).await?;

        Ok(dates
            .iter()
            .map(|&date| {
                let query = OddsQuery {
                    coordinate,
                    date,
                    thresholds,
                };
                (query, compute_odds(&series, date, &thresholds))
            })
            .collect())
    }

    pub fn cached_locations(&self) -> usize {
        self.source.cache().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasources::climate_source::tests::CountingFetcher;
    use crate::models::{ClimateSeries, OddsCategory};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dubai_series() -> ClimateSeries {
        let mut series = ClimateSeries::default();
        for (year, max, min) in [(1981, 41.0, 30.0), (1982, 43.5, 31.0), (1983, 39.0, 29.5)] {
            series.max_temp_c.insert(date(year, 7, 15), max);
            series.min_temp_c.insert(date(year, 7, 15), min);
            series.wind_speed_ms.insert(date(year, 7, 15), 4.0);
            series.max_temp_c.insert(date(year, 1, 10), 24.0);
        }
        series
    }

    fn dubai() -> GeoCoordinate {
        GeoCoordinate::new(25.2048, 55.2708)
    }

    #[tokio::test]
    async fn repeated_query_fetches_once() {
        let fetcher = CountingFetcher::new(dubai_series());
        let calls = Arc::clone(&fetcher.calls);
        let service = OddsService::new(fetcher);
        let query = OddsQuery {
            coordinate: dubai(),
            date: date(2025, 7, 15),
            thresholds: ThresholdSet {
                hot: Some(40.0),
                ..Default::default()
            },
        };

        let first = service.query(&query).await.unwrap();
        let second = service.query(&query).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert!((first.results[0].value_percent - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(service.cached_locations(), 1);
    }

    #[tokio::test]
    async fn several_dates_share_one_fetch() {
        let fetcher = CountingFetcher::new(dubai_series());
        let calls = Arc::clone(&fetcher.calls);
        let service = OddsService::new(fetcher);
        let thresholds = ThresholdSet {
            hot: Some(30.0),
            wind: Some(14.0),
            ..Default::default()
        };

        let reports = service
            .query_dates(
                dubai(),
                &[date(2025, 7, 15), date(2025, 1, 10), date(2025, 4, 1)],
                thresholds,
            )
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(reports.len(), 3);

        let (july_query, july) = &reports[0];
        assert_eq!(july_query.date, date(2025, 7, 15));
        assert_eq!(july.results[0].category, OddsCategory::Hot);
        assert_eq!(july.results[0].value_percent, 100.0);
        // 4 m/s = 14.4 km/h
        assert_eq!(july.results[1].value_percent, 100.0);

        let (_, january) = &reports[1];
        assert_eq!(january.results[0].value_percent, 0.0);
        assert_eq!(january.summary.unwrap().avg_low_c, 24.0);

        let (_, april) = &reports[2];
        assert!(april.summary.is_none());
        assert!(april.results.iter().all(|r| r.value_percent == 0.0));
    }
}
