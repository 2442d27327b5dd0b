use crate::error::Result;
use crate::logic::OddsQuery;
use crate::models::{OddsReport, OddsResult, ThresholdSet, WeatherSummary};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

pub const DISCLAIMER: &str = "Odds are historical frequencies from NASA POWER daily data \
     (1981-2020) for the same day of the year. They describe past climate, not a forecast.";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub generated_at: DateTime<Utc>,
    pub query: ExportQuery,
    pub results: Vec<OddsResult>,
    pub summary: Option<WeatherSummary>,
    pub disclaimer: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub date: NaiveDate,
    pub thresholds: ThresholdSet,
}

impl ExportDocument {
    pub fn new(query: &OddsQuery, report: &OddsReport, generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            query: ExportQuery {
                latitude: query.coordinate.latitude,
                longitude: query.coordinate.longitude,
                date: query.date,
                thresholds: query.thresholds,
            },
            results: report.results.clone(),
            summary: report.summary,
            disclaimer: DISCLAIMER,
        }
    }
}

/// Render documents as pretty JSON with keys sorted at every level.
///
/// A single document is written as an object, several as an array.
pub fn to_json(documents: &[ExportDocument]) -> Result<String> {
    // serde_json's default Value map is ordered by key
    let value = match documents {
        [single] => serde_json::to_value(single)?,
        many => serde_json::to_value(many)?,
    };
    Ok(serde_json::to_string_pretty(&value)?)
}
