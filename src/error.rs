use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherOddsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WeatherOddsError {
    /// Failures talking to the climate provider. Retrying later may help.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WeatherOddsError::Network(_) | WeatherOddsError::Provider(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WeatherOddsError>;
