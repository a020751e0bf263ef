//! Error types for forecast client operations

use thiserror::Error;

/// Forecast client errors
///
/// The `Display` form of each variant is the user-visible banner text, so
/// transport failures embed their cause and service-reported errors are shown
/// verbatim.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Network unreachable, timeout, or a body that is not JSON
    #[error("Error fetching data: {0}")]
    Transport(String),

    /// Well-formed response carrying an `error` field
    #[error("{0}")]
    Service(String),

    /// Forecast horizon could not be coerced to a positive whole number of days
    #[error("Invalid forecast horizon '{raw}': expected a whole number of days (at least 1)")]
    InvalidHorizon { raw: String },

    /// JSON was valid but not shaped like the expected payload
    #[error("Unexpected response shape: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error while saving charts
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for forecast operations
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<reqwest::Error> for ForecastError {
    fn from(err: reqwest::Error) -> Self {
        ForecastError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for ForecastError {
    fn from(err: url::ParseError) -> Self {
        ForecastError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ForecastError::Service("Symbol required".to_string());
        assert_eq!(err.to_string(), "Symbol required");

        let err = ForecastError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "Error fetching data: connection refused");

        let err = ForecastError::InvalidHorizon { raw: "abc".to_string() };
        assert!(err.to_string().contains("'abc'"));
    }

    #[test]
    fn test_non_json_is_transport() {
        let parse_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err: ForecastError = parse_err.into();
        assert!(matches!(err, ForecastError::Transport(_)));
        assert!(err.to_string().starts_with("Error fetching data: "));
    }
}
