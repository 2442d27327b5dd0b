use crate::error::{Result, WeatherOddsError};
use crate::models::{GeoCoordinate, ThresholdSet};
use dialoguer::Input;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";
pub const DEFAULT_USER_AGENT: &str = concat!("weatherodds/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationConfig>,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationConfig {
    pub fn coordinate(&self) -> GeoCoordinate {
        GeoCoordinate::new(self.latitude, self.longitude)
    }
}

/// A named set of thresholds, e.g. "beach" or "ski".
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Preset {
    pub name: String,
    #[serde(flatten)]
    pub thresholds: ThresholdSet,
}

impl Config {
    /// Load config from an explicit path, or from the standard locations.
    /// Falls back to built-in defaults when no file exists anywhere.
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => {
                if !p.exists() {
                    return Err(WeatherOddsError::Config(format!(
                        "Config file not found at {:?}",
                        p
                    )));
                }
                p
            }
            None => match Self::find_config_path() {
                Some(p) => p,
                None => {
                    tracing::info!("No config file found, using defaults");
                    return Ok(Config::default());
                }
            },
        };

        Self::load_from(&config_path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| WeatherOddsError::Config(format!("Failed to read config: {}", e)))?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = Self::substitute_env_vars(content);

        serde_yaml::from_str(&content)
            .map_err(|e| WeatherOddsError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Search for config.yaml in the working directory, then the XDG config directory.
    fn find_config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Some(local_config);
        }

        dirs::config_dir()
            .map(|dir| dir.join("weatherodds").join("config.yaml"))
            .filter(|p| p.exists())
    }

    /// Default path for writing new config files (~/.config/weatherodds/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| WeatherOddsError::Config("Cannot determine config directory".into()))?
            .join("weatherodds");
        Ok(config_dir.join("config.yaml"))
    }

    pub fn preset(&self, name: &str) -> Result<&Preset> {
        self.presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                WeatherOddsError::InvalidInput(format!("Unknown preset '{}'", name))
            })
    }

    /// Run interactive setup prompts and write config to disk.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up weatherodds.");
        println!();

        println!("NASA POWER");
        let user_agent: String = Input::new()
            .with_prompt("  Client identifier (sent as User-Agent)")
            .default(DEFAULT_USER_AGENT.to_string())
            .interact_text()
            .map_err(|e| WeatherOddsError::Config(format!("Input error: {}", e)))?;

        println!();
        println!("Default location (leave latitude blank to skip)");
        let latitude: String = Input::new()
            .with_prompt("  Latitude")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| WeatherOddsError::Config(format!("Input error: {}", e)))?;

        let location = if latitude.trim().is_empty() {
            None
        } else {
            let latitude: f64 = latitude.trim().parse().map_err(|_| {
                WeatherOddsError::Config(format!("Invalid latitude '{}'", latitude))
            })?;
            let longitude: f64 = Input::new()
                .with_prompt("  Longitude")
                .interact_text()
                .map_err(|e| WeatherOddsError::Config(format!("Input error: {}", e)))?;
            Some(LocationConfig {
                latitude,
                longitude,
            })
        };

        let config = Config {
            provider: ProviderConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                user_agent,
            },
            location,
            presets: Vec::new(),
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| WeatherOddsError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# weatherodds configuration\n# Generated by `weatherodds init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!();
        println!("Configuration saved to {}", config_path.display());

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return result,
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert!(config.provider.user_agent.starts_with("weatherodds/"));
        assert!(config.location.is_none());
        assert!(config.presets.is_empty());
    }

    #[test]
    fn parses_location_and_presets() {
        let yaml = r#"
provider:
  user_agent: "odds-test (ops@example.com)"
location:
  latitude: 25.2048
  longitude: 55.2708
presets:
  - name: beach
    hot: 35
    wind: 30
  - name: ski
    cold: -5
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.provider.user_agent, "odds-test (ops@example.com)");

        let coord = config.location.unwrap().coordinate();
        assert_eq!(coord, GeoCoordinate::new(25.2048, 55.2708));

        let beach = config.preset("Beach").unwrap();
        assert_eq!(beach.thresholds.hot, Some(35.0));
        assert_eq!(beach.thresholds.wind, Some(30.0));
        assert_eq!(beach.thresholds.cold, None);

        let ski = config.preset("ski").unwrap();
        assert_eq!(ski.thresholds.cold, Some(-5.0));
    }

    #[test]
    fn unknown_preset_is_invalid_input() {
        let config = Config::default();
        let err = config.preset("picnic").unwrap_err();
        assert!(matches!(err, WeatherOddsError::InvalidInput(_)));
    }

    #[test]
    fn substitutes_environment_variables() {
        std::env::set_var("WEATHERODDS_TEST_AGENT", "agent-from-env");
        let config =
            Config::from_yaml("provider:\n  user_agent: \"${WEATHERODDS_TEST_AGENT}\"\n").unwrap();
        assert_eq!(config.provider.user_agent, "agent-from-env");
    }

    #[test]
    fn malformed_yaml_is_config_error() {
        let err = Config::from_yaml("presets: [name: ").unwrap_err();
        assert!(matches!(err, WeatherOddsError::Config(_)));
    }

    #[test]
    fn missing_override_path_is_config_error() {
        let err = Config::load(Some(PathBuf::from("/nonexistent/weatherodds.yaml"))).unwrap_err();
        assert!(matches!(err, WeatherOddsError::Config(_)));
    }
}
