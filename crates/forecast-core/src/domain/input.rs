use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::domain::Symbol;

/// Horizon the service uses when a request omits it
pub const DEFAULT_FORECAST_DAYS: u32 = 7;

/// Number of days to forecast, as coerced from user input.
///
/// Coercion never fails: text that is not a positive whole number is kept as
/// [`ForecastHorizon::Invalid`] and rejected later by the forecast fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastHorizon {
    Days(u32),
    Invalid(String),
}

impl ForecastHorizon {
    /// Numeric coercion of free-text input.
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(value)
                if value.is_finite()
                    && value.fract() == 0.0
                    && value >= 1.0
                    && value <= f64::from(u32::MAX) =>
            {
                Self::Days(value as u32)
            }
            _ => Self::Invalid(raw.to_string()),
        }
    }

    pub const fn days(&self) -> Option<u32> {
        match self {
            Self::Days(days) => Some(*days),
            Self::Invalid(_) => None,
        }
    }
}

impl Default for ForecastHorizon {
    fn default() -> Self {
        Self::Days(DEFAULT_FORECAST_DAYS)
    }
}

impl Display for ForecastHorizon {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Days(days) => write!(f, "{days}"),
            Self::Invalid(raw) => f.write_str(raw),
        }
    }
}

/// User-entered symbol and horizon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    symbol: String,
    horizon: ForecastHorizon,
}

impl InputState {
    pub fn new(symbol: impl Into<String>, horizon: ForecastHorizon) -> Self {
        Self {
            symbol: symbol.into(),
            horizon,
        }
    }

    /// Build from raw text fields as a form would hold them.
    pub fn from_text(symbol: impl Into<String>, horizon: &str) -> Self {
        Self::new(symbol, ForecastHorizon::coerce(horizon))
    }

    pub fn set_symbol(&mut self, raw: impl Into<String>) {
        self.symbol = raw.into();
    }

    pub fn set_horizon_text(&mut self, raw: &str) {
        self.horizon = ForecastHorizon::coerce(raw);
    }

    pub fn set_horizon_days(&mut self, days: u32) {
        self.horizon = if days == 0 {
            ForecastHorizon::Invalid(days.to_string())
        } else {
            ForecastHorizon::Days(days)
        };
    }

    /// Raw symbol text as entered
    pub fn symbol_text(&self) -> &str {
        &self.symbol
    }

    pub fn symbol(&self) -> Symbol {
        Symbol::new(&self.symbol)
    }

    pub fn horizon(&self) -> &ForecastHorizon {
        &self.horizon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerces_whole_numbers() {
        assert_eq!(ForecastHorizon::coerce("14"), ForecastHorizon::Days(14));
        assert_eq!(ForecastHorizon::coerce(" 3 "), ForecastHorizon::Days(3));
        assert_eq!(ForecastHorizon::coerce("7.0"), ForecastHorizon::Days(7));
    }

    #[test]
    fn test_keeps_invalid_text_uncorrected() {
        for raw in ["", "abc", "0", "-2", "2.5", "NaN", "inf"] {
            assert_eq!(
                ForecastHorizon::coerce(raw),
                ForecastHorizon::Invalid(raw.to_string()),
                "input {raw:?}"
            );
        }
    }

    #[test]
    fn test_input_state_edits() {
        let mut input = InputState::default();
        assert_eq!(input.horizon().days(), Some(DEFAULT_FORECAST_DAYS));

        input.set_symbol(" tsla");
        input.set_horizon_text("");
        assert_eq!(input.symbol().as_str(), "TSLA");
        assert_eq!(input.symbol_text(), " tsla");
        assert_eq!(input.horizon().days(), None);

        input.set_horizon_days(0);
        assert!(matches!(input.horizon(), ForecastHorizon::Invalid(_)));
        input.set_horizon_days(30);
        assert_eq!(input.horizon().days(), Some(30));
    }
}
