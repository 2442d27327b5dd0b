use crate::config::Config;
use crate::error::{Result, WeatherOddsError};
use crate::models::{GeoCoordinate, ThresholdSet};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "weatherodds",
    version,
    about = "Historical odds of hot, cold, wet or windy weather for a place and date"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute weather odds for a location and one or more dates
    Odds(OddsArgs),
    /// List configured threshold presets
    Presets,
    /// Validate config and test the NASA POWER connection
    Check(LocationArgs),
    /// Run interactive setup
    Init,
}

#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Latitude in degrees (defaults to the configured location)
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in degrees (defaults to the configured location)
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl LocationArgs {
    pub fn resolve(&self, config: &Config) -> Result<GeoCoordinate> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(GeoCoordinate::new(lat, lon)),
            (None, None) => config
                .location
                .map(|l| l.coordinate())
                .ok_or_else(|| {
                    WeatherOddsError::InvalidInput(
                        "No location given. Pass --lat and --lon or set `location` in config."
                            .into(),
                    )
                }),
            _ => Err(WeatherOddsError::InvalidInput(
                "--lat and --lon must be given together".into(),
            )),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct OddsArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Target date (YYYY-MM-DD). Repeat for several dates; defaults to today
    #[arg(long = "date")]
    pub dates: Vec<NaiveDate>,

    /// Odds of the daily high exceeding this (°C)
    #[arg(long, allow_negative_numbers = true)]
    pub hot: Option<f64>,

    /// Odds of the daily low falling below this (°C)
    #[arg(long, allow_negative_numbers = true)]
    pub cold: Option<f64>,

    /// Odds of at least this much precipitation (mm)
    #[arg(long)]
    pub rain: Option<f64>,

    /// Odds of wind at or above this speed (km/h)
    #[arg(long)]
    pub wind: Option<f64>,

    /// Start from a named preset; explicit thresholds override it
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Print the export document as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the export document to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl OddsArgs {
    pub fn thresholds(&self, config: &Config) -> Result<ThresholdSet> {
        let explicit = ThresholdSet {
            hot: self.hot,
            cold: self.cold,
            rain: self.rain,
            wind: self.wind,
        };

        match &self.preset {
            Some(name) => Ok(explicit.or(config.preset(name)?.thresholds)),
            None => Ok(explicit),
        }
    }

    pub fn dates_or(&self, today: NaiveDate) -> Vec<NaiveDate> {
        if self.dates.is_empty() {
            vec![today]
        } else {
            self.dates.clone()
        }
    }
}
