use super::climate::DailyRecord;
use serde::{Deserialize, Serialize};

/// Thresholds to evaluate. Absent values are skipped entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    /// Daily high above this (°C)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot: Option<f64>,
    /// Daily low below this (°C)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cold: Option<f64>,
    /// Precipitation at or above this (mm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<f64>,
    /// Wind speed at or above this (km/h)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<f64>,
}

impl ThresholdSet {
    /// Present thresholds in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (OddsCategory, f64)> {
        [
            (OddsCategory::Hot, self.hot),
            (OddsCategory::Cold, self.cold),
            (OddsCategory::Rain, self.rain),
            (OddsCategory::Wind, self.wind),
        ]
        .into_iter()
        .filter_map(|(category, value)| value.map(|v| (category, v)))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Values set here win; anything unset is taken from `base`.
    pub fn or(self, base: ThresholdSet) -> ThresholdSet {
        ThresholdSet {
            hot: self.hot.or(base.hot),
            cold: self.cold.or(base.cold),
            rain: self.rain.or(base.rain),
            wind: self.wind.or(base.wind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsCategory {
    Hot,
    Cold,
    Rain,
    Wind,
}

impl OddsCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OddsCategory::Hot => "hot",
            OddsCategory::Cold => "cold",
            OddsCategory::Rain => "rain",
            OddsCategory::Wind => "wind",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            OddsCategory::Hot => "🌡",
            OddsCategory::Cold => "❄",
            OddsCategory::Rain => "🌧",
            OddsCategory::Wind => "💨",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            OddsCategory::Hot | OddsCategory::Cold => "°C",
            OddsCategory::Rain => "mm",
            OddsCategory::Wind => "km/h",
        }
    }

    /// Human-readable label with the threshold truncated to a whole number.
    pub fn label(&self, threshold: f64) -> String {
        let value = threshold as i64;
        match self {
            OddsCategory::Hot => format!("High > {}{}", value, self.unit()),
            OddsCategory::Cold => format!("Low < {}{}", value, self.unit()),
            OddsCategory::Rain => format!("Rain ≥ {} {}", value, self.unit()),
            OddsCategory::Wind => format!("Wind ≥ {} {}", value, self.unit()),
        }
    }

    pub fn note(&self) -> &'static str {
        match self {
            OddsCategory::Hot => {
                "Share of past years where the daily high was above this temperature on this day."
            }
            OddsCategory::Cold => {
                "Share of past years where the daily low was below this temperature on this day."
            }
            OddsCategory::Rain => {
                "Share of past years with at least this much precipitation on this day."
            }
            OddsCategory::Wind => {
                "Share of past years where the average wind reached this speed on this day."
            }
        }
    }

    /// Whether a day crosses the threshold for this metric.
    ///
    /// Temperatures compare strictly, precipitation and wind inclusively.
    pub fn is_exceeded_by(&self, record: &DailyRecord, threshold: f64) -> bool {
        match self {
            OddsCategory::Hot => record.max_temp_c > threshold,
            OddsCategory::Cold => record.min_temp_c < threshold,
            OddsCategory::Rain => record.precipitation_mm >= threshold,
            OddsCategory::Wind => record.wind_speed_kph >= threshold,
        }
    }
}

impl std::fmt::Display for OddsCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsResult {
    pub label: String,
    /// 0.0-100.0, unrounded
    pub value_percent: f64,
    pub note: String,
    pub category: OddsCategory,
}

impl OddsResult {
    pub fn new(category: OddsCategory, threshold: f64, value_percent: f64) -> Self {
        Self {
            label: category.label(threshold),
            value_percent,
            note: category.note().to_string(),
            category,
        }
    }
}

/// Mean conditions across the matching historical days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSummary {
    #[serde(rename = "avgHighC")]
    pub avg_high_c: f64,
    #[serde(rename = "avgLowC")]
    pub avg_low_c: f64,
    #[serde(rename = "avgPrecipMM")]
    pub avg_precip_mm: f64,
    #[serde(rename = "avgWindKPH")]
    pub avg_wind_kph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsReport {
    pub results: Vec<OddsResult>,
    pub summary: Option<WeatherSummary>,
}
