use super::climate_source::ClimateFetcher;
use crate::config::ProviderConfig;
use crate::error::{Result, WeatherOddsError};
use crate::models::{ClimateSeries, GeoCoordinate, SERIES_END_YEAR, SERIES_START_YEAR};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PARAMETERS: &str = "T2M_MAX,T2M_MIN,PRECTOTCORR,WS10M";
const COMMUNITY: &str = "RE";

/// POWER marks missing readings with this value
const FILL_VALUE: f64 = -999.0;

/// Characters of an error body kept in a provider error
const ERROR_BODY_LIMIT: usize = 200;

/// Client for the NASA POWER daily point API.
pub struct PowerClient {
    client: reqwest::Client,
    config: ProviderConfig,
}

// NASA POWER API response structures
#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: PowerParameters,
}

#[derive(Debug, Deserialize)]
struct PowerParameters {
    #[serde(rename = "T2M_MAX", default)]
    t2m_max: HashMap<String, Option<f64>>,
    #[serde(rename = "T2M_MIN", default)]
    t2m_min: HashMap<String, Option<f64>>,
    #[serde(rename = "PRECTOTCORR", default)]
    prectotcorr: HashMap<String, Option<f64>>,
    #[serde(rename = "WS10M", default)]
    ws10m: HashMap<String, Option<f64>>,
}

impl PowerClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                WeatherOddsError::Config(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    pub fn series_url(&self, coordinate: GeoCoordinate) -> String {
        format!(
            "{}?parameters={}&community={}&longitude={:.4}&latitude={:.4}&start={}&end={}&format=JSON",
            self.config.base_url,
            PARAMETERS,
            COMMUNITY,
            coordinate.longitude,
            coordinate.latitude,
            SERIES_START_YEAR,
            SERIES_END_YEAR
        )
    }

    /// Fetch 40 years of daily history for a coordinate
    pub async fn fetch_daily_history(&self, coordinate: GeoCoordinate) -> Result<ClimateSeries> {
        let url = self.series_url(coordinate);
        tracing::info!("Requesting NASA POWER history for {}", coordinate);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| WeatherOddsError::Network(format!("NASA POWER: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("NASA POWER returned {} for {}", status, coordinate);
            return Err(WeatherOddsError::Provider(format!(
                "NASA POWER returned {}: {}",
                status,
                error_excerpt(&body)
            )));
        }

        let body = response.text().await.map_err(|e| {
            WeatherOddsError::Network(format!("Failed to read NASA POWER response: {}", e))
        })?;

        let series = parse_series(&body)?;
        tracing::debug!(
            "Parsed {} days of history for {} ({} lows, {} precipitation, {} wind)",
            series.max_temp_c.len(),
            coordinate,
            series.min_temp_c.len(),
            series.precipitation_mm.len(),
            series.wind_speed_ms.len()
        );

        Ok(series)
    }
}

#[async_trait]
impl ClimateFetcher for PowerClient {
    async fn fetch_series(&self, coordinate: GeoCoordinate) -> Result<ClimateSeries> {
        self.fetch_daily_history(coordinate).await
    }
}

/// Decode a POWER JSON body. Parameters missing from the body become empty mappings.
fn parse_series(body: &str) -> Result<ClimateSeries> {
    let response: PowerResponse = serde_json::from_str(body).map_err(|e| {
        WeatherOddsError::Provider(format!("Failed to parse NASA POWER response: {}", e))
    })?;
    let parameters = response.properties.parameter;

    Ok(ClimateSeries {
        max_temp_c: decode_parameter("T2M_MAX", parameters.t2m_max)?,
        min_temp_c: decode_parameter("T2M_MIN", parameters.t2m_min)?,
        precipitation_mm: decode_parameter("PRECTOTCORR", parameters.prectotcorr)?,
        wind_speed_ms: decode_parameter("WS10M", parameters.ws10m)?,
    })
}

fn decode_parameter(
    name: &str,
    readings: HashMap<String, Option<f64>>,
) -> Result<BTreeMap<NaiveDate, f64>> {
    let mut decoded = BTreeMap::new();
    for (key, value) in readings {
        let date = parse_date_key(&key).ok_or_else(|| {
            WeatherOddsError::Provider(format!("{} has invalid date key '{}'", name, key))
        })?;
        // null and fill values are missing readings, not zeros
        if let Some(value) = value.filter(|v| *v != FILL_VALUE) {
            decoded.insert(date, value);
        }
    }
    Ok(decoded)
}

/// First part of an error body, cut on a char boundary
fn error_excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

/// Parse a "YYYYMMDD" key into a calendar date
fn parse_date_key(key: &str) -> Option<NaiveDate> {
    if key.len() != 8 || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = key[0..4].parse().ok()?;
    let month = key[4..6].parse().ok()?;
    let day = key[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
