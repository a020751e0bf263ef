//! Log configuration loaded from the environment

use serde::{Deserialize, Serialize};

/// Environment variable holding the `EnvFilter` directive.
pub const LOG_FILTER_VAR: &str = "FORECAST_LOG";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_VAR: &str = "FORECAST_LOG_FORMAT";

const DEFAULT_FILTER: &str = "warn,forecast_core=info";

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    /// Parse a format name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `warn,forecast_core=debug`
    pub filter: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Load from `FORECAST_LOG` / `FORECAST_LOG_FORMAT`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let filter = lookup(LOG_FILTER_VAR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.filter);
        let format = lookup(LOG_FORMAT_VAR)
            .and_then(|value| LogFormat::parse(&value))
            .unwrap_or(defaults.format);

        Self { filter, format }
    }
}
