use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provider wind speeds are m/s; everything downstream works in km/h.
pub const MS_TO_KPH: f64 = 3.6;

/// First and last provider years included in every series.
pub const SERIES_START_YEAR: i32 = 1981;
pub const SERIES_END_YEAR: i32 = 2020;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One day of history for one location.
///
/// Only exists for dates with a recorded maximum temperature; the other
/// readings have already been defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub max_temp_c: f64,
    /// Falls back to `max_temp_c` when the provider has no minimum for the day
    pub min_temp_c: f64,
    pub precipitation_mm: f64,
    pub wind_speed_kph: f64,
}

/// Daily history for one location, one mapping per provider parameter.
///
/// Readings stay in provider units (wind in m/s) until a `DailyRecord`
/// is built from them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClimateSeries {
    pub max_temp_c: BTreeMap<NaiveDate, f64>,
    pub min_temp_c: BTreeMap<NaiveDate, f64>,
    pub precipitation_mm: BTreeMap<NaiveDate, f64>,
    pub wind_speed_ms: BTreeMap<NaiveDate, f64>,
}

impl ClimateSeries {
    /// Number of days with a maximum temperature, i.e. days that can form a record
    pub fn len(&self) -> usize {
        self.max_temp_c.len()
    }

    pub fn is_empty(&self) -> bool {
        self.max_temp_c.is_empty()
    }

    #[cfg(test)]
    pub fn record(&self, date: NaiveDate) -> Option<DailyRecord> {
        let max_temp_c = *self.max_temp_c.get(&date)?;
        Some(self.build_record(date, max_temp_c))
    }

    /// All records, in date order, anchored on the max temperature mapping.
    pub fn records(&self) -> impl Iterator<Item = DailyRecord> + '_ {
        self.max_temp_c
            .iter()
            .map(|(date, max)| self.build_record(*date, *max))
    }

    fn build_record(&self, date: NaiveDate, max_temp_c: f64) -> DailyRecord {
        DailyRecord {
            date,
            max_temp_c,
            min_temp_c: self.min_temp_c.get(&date).copied().unwrap_or(max_temp_c),
            precipitation_mm: self.precipitation_mm.get(&date).copied().unwrap_or(0.0),
            wind_speed_kph: self
                .wind_speed_ms
                .get(&date)
                .map(|ms| ms * MS_TO_KPH)
                .unwrap_or(0.0),
        }
    }
}
