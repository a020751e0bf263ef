//! Configuration for the forecast client

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Base URL of the prediction service when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Environment variable overriding the service base URL
pub const BASE_URL_VAR: &str = "FORECAST_API_BASE";

/// Environment variable overriding the request timeout, in seconds
pub const TIMEOUT_VAR: &str = "FORECAST_TIMEOUT_SECS";

/// How the metadata and forecast fetches of one predict action are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Metadata resolves fully before the forecast request is dispatched
    #[default]
    Sequential,
    /// Both requests are in flight at once
    Concurrent,
}

/// What happens when an outcome resolves after a newer request was dispatched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Outcomes from superseded requests are dropped
    #[default]
    DiscardStale,
    /// Whatever resolves last is applied, even if it was dispatched earlier
    LastResolvedWins,
}

/// Configuration for the forecast client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Prediction service base URL
    pub base_url: Url,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Scheduling of the two fetches
    pub dispatch: DispatchMode,

    /// Handling of out-of-order resolutions
    pub stale_policy: StalePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: Duration::from_secs(30),
            dispatch: DispatchMode::Sequential,
            stale_policy: StalePolicy::DiscardStale,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).unwrap_or_else(|_| unreachable!("default base URL is valid"))
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Apply `FORECAST_API_BASE` / `FORECAST_TIMEOUT_SECS` when set
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(base) = lookup(BASE_URL_VAR) {
            self.base_url = Url::parse(base.trim())?;
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ForecastError::Config(format!("{TIMEOUT_VAR} must be a whole number of seconds, got '{raw}'"))
            })?;
            self.request_timeout = Duration::from_secs(secs);
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(ForecastError::Config(format!(
                "base URL must use http or https, got '{}'",
                self.base_url.scheme()
            )));
        }

        if self.base_url.cannot_be_a_base() {
            return Err(ForecastError::Config(format!(
                "base URL '{}' cannot carry path segments",
                self.base_url
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(ForecastError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<String>,
    request_timeout: Option<Duration>,
    dispatch: Option<DispatchMode>,
    stale_policy: Option<StalePolicy>,
}

impl ClientConfigBuilder {
    /// Set the service base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set dispatch mode
    pub fn dispatch(mut self, mode: DispatchMode) -> Self {
        self.dispatch = Some(mode);
        self
    }

    /// Set stale-response policy
    pub fn stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = Some(policy);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();

        let base_url = match self.base_url {
            Some(raw) => Url::parse(raw.trim())?,
            None => defaults.base_url,
        };

        let config = ClientConfig {
            base_url,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            dispatch: self.dispatch.unwrap_or(defaults.dispatch),
            stale_policy: self.stale_policy.unwrap_or(defaults.stale_policy),
        };

        config.validate()?;
        Ok(config)
    }
}
