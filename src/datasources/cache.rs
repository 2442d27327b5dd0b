use crate::models::{ClimateSeries, GeoCoordinate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Decimal places kept when keying the cache (~11 m).
const KEY_SCALE: f64 = 10_000.0;

/// A coordinate rounded to 4 decimal places, stored as scaled integers so it can be hashed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordinateKey {
    lat_e4: i64,
    lon_e4: i64,
}

impl CoordinateKey {
    pub fn coordinate(&self) -> GeoCoordinate {
        GeoCoordinate::new(
            self.lat_e4 as f64 / KEY_SCALE,
            self.lon_e4 as f64 / KEY_SCALE,
        )
    }
}

impl From<GeoCoordinate> for CoordinateKey {
    fn from(coordinate: GeoCoordinate) -> Self {
        Self {
            lat_e4: (coordinate.latitude * KEY_SCALE).round() as i64,
            lon_e4: (coordinate.longitude * KEY_SCALE).round() as i64,
        }
    }
}

impl std::fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.coordinate())
    }
}

/// In-memory series cache. Each key is written once and never replaced or evicted.
#[derive(Debug, Default)]
pub struct SeriesCache {
    entries: Mutex<HashMap<CoordinateKey, Arc<ClimateSeries>>>,
}

impl SeriesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CoordinateKey) -> Option<Arc<ClimateSeries>> {
        self.lock().get(key).cloned()
    }

    /// Insert a series unless the key is already present. Returns the cached series,
    /// which is the earlier one if another fetch got there first.
    pub fn put(&self, key: CoordinateKey, series: ClimateSeries) -> Arc<ClimateSeries> {
        let mut entries = self.lock();
        if let Some(existing) = entries.get(&key) {
            tracing::debug!("Series for {} already cached, dropping duplicate", key);
            return Arc::clone(existing);
        }
        let series = Arc::new(series);
        entries.insert(key, Arc::clone(&series));
        series
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CoordinateKey, Arc<ClimateSeries>>> {
        // Entries are only ever inserted whole, so a poisoned map is still consistent
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series_with_max(max: f64) -> ClimateSeries {
        let mut series = ClimateSeries::default();
        series
            .max_temp_c
            .insert(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), max);
        series
    }

    #[test]
    fn key_rounds_to_four_decimals() {
        let a = CoordinateKey::from(GeoCoordinate::new(25.20481, 55.27079));
        let b = CoordinateKey::from(GeoCoordinate::new(25.2048, 55.2708));
        let c = CoordinateKey::from(GeoCoordinate::new(25.2049, 55.2708));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.coordinate(), GeoCoordinate::new(25.2048, 55.2708));
    }

    #[test]
    fn key_handles_negative_coordinates() {
        let key = CoordinateKey::from(GeoCoordinate::new(-33.86882, -151.20929));
        assert_eq!(key.coordinate(), GeoCoordinate::new(-33.8688, -151.2093));
        assert_eq!(key.to_string(), "-33.8688, -151.2093");
    }

    #[test]
    fn get_returns_stored_series() {
        let cache = SeriesCache::new();
        let key = CoordinateKey::from(GeoCoordinate::new(51.5, -0.12));
        assert!(cache.get(&key).is_none());

        cache.put(key, series_with_max(21.0));

        let cached = cache.get(&key).unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn first_write_wins() {
        let cache = SeriesCache::new();
        let key = CoordinateKey::from(GeoCoordinate::new(40.0, -74.0));

        let first = cache.put(key, series_with_max(10.0));
        let second = cache.put(key, series_with_max(99.0));

        assert!(Arc::ptr_eq(&first, &second));
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert_eq!(cache.get(&key).unwrap().max_temp_c[&date], 10.0);
        assert_eq!(cache.len(), 1);
    }
}
