use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::Symbol;

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Forecasting model identifier.
///
/// Ordering is the column order of the consolidated table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    Lstm,
    #[serde(rename = "xgboost")]
    XgBoost,
    Combined,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [Self::Lstm, Self::XgBoost, Self::Combined];

    /// Key used by the service payload and in file names.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lstm => "lstm",
            Self::XgBoost => "xgboost",
            Self::Combined => "combined",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Lstm => "LSTM",
            Self::XgBoost => "XGBoost",
            Self::Combined => "Combined",
        }
    }

    /// Header of this model's column in the forecast table.
    pub const fn column_header(self) -> &'static str {
        match self {
            Self::Lstm => "Forecast by LSTM",
            Self::XgBoost => "Forecast by XGBoost",
            Self::Combined => "Final Forecast",
        }
    }
}

impl Display for ModelId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of diagnostic chart the service renders per model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    ActualVsPredicted,
    ForecastedPrices,
    TrainingVsValidationLoss,
    ResidualsHistogram,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        Self::ActualVsPredicted,
        Self::ForecastedPrices,
        Self::TrainingVsValidationLoss,
        Self::ResidualsHistogram,
    ];

    /// Graph key stem used by the service, before the per-model suffix.
    pub const fn key(self) -> &'static str {
        match self {
            Self::ActualVsPredicted => "actual_vs_predicted",
            Self::ForecastedPrices => "forecasted_prices",
            Self::TrainingVsValidationLoss => "training_vs_validation_loss",
            Self::ResidualsHistogram => "residuals_histogram",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::ActualVsPredicted => "Actual vs Predicted Stock Prices",
            Self::ForecastedPrices => "Forecasted Stock Prices",
            Self::TrainingVsValidationLoss => "Training vs Validation Loss",
            Self::ResidualsHistogram => "Residuals Histogram",
        }
    }

    pub const fn alt(self) -> &'static str {
        match self {
            Self::ActualVsPredicted => "Actual vs Predicted",
            Self::ForecastedPrices => "Forecasted Prices",
            Self::TrainingVsValidationLoss => "Training vs Validation Loss",
            Self::ResidualsHistogram => "Residuals Histogram",
        }
    }
}

/// One forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(
        serialize_with = "serialize_forecast_date",
        deserialize_with = "deserialize_forecast_date"
    )]
    pub date: NaiveDateTime,
    pub value: f64,
}

impl ForecastPoint {
    pub fn new(date: NaiveDateTime, value: f64) -> Self {
        Self { date, value }
    }

    /// Calendar date part only, as shown in the table.
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

/// Parse the service's date formats.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` and its `T`-separated variant (both with
/// optional fractional seconds), offset-carrying forms such as
/// `2024-05-02 00:00:00-04:00` or RFC 3339 with `Z` (the local wall time is
/// kept, the offset dropped), and finally any string starting with a
/// `YYYY-MM-DD` calendar date (midnight).
pub fn parse_forecast_date(raw: &str) -> Option<NaiveDateTime> {
    const NAIVE_FORMATS: [&str; 4] = [
        DATE_TIME_FORMAT,
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

    let raw = raw.trim();

    if let Some(parsed) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(parsed);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local());
    }
    if let Some(parsed) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
    {
        return Some(parsed.naive_local());
    }

    // leading calendar date, whatever follows it
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn serialize_forecast_date<S: Serializer>(
    date: &NaiveDateTime,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format(DATE_TIME_FORMAT).to_string())
}

fn deserialize_forecast_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_forecast_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized forecast date '{raw}'")))
}

/// Forecast series and chart references of one model.
///
/// `series` is in ascending date order as sent by the service; index `i` of
/// every model refers to the same forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelForecast {
    pub model: ModelId,
    pub series: Vec<ForecastPoint>,
    pub charts: BTreeMap<ChartKind, String>,
}

impl ModelForecast {
    pub fn new(model: ModelId, series: Vec<ForecastPoint>) -> Self {
        Self {
            model,
            series,
            charts: BTreeMap::new(),
        }
    }

    pub fn with_chart(mut self, kind: ChartKind, reference: impl Into<String>) -> Self {
        self.charts.insert(kind, reference.into());
        self
    }
}

/// Complete multi-model response for one prediction request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastBundle {
    /// Symbol echoed by the service, when it sends one
    pub symbol: Option<Symbol>,
    pub current_price: Option<f64>,
    pub models: BTreeMap<ModelId, ModelForecast>,
}

impl ForecastBundle {
    pub fn new(current_price: f64) -> Self {
        Self {
            symbol: None,
            current_price: Some(current_price),
            models: BTreeMap::new(),
        }
    }

    pub fn with_model(mut self, forecast: ModelForecast) -> Self {
        self.models.insert(forecast.model, forecast);
        self
    }

    pub fn model(&self, id: ModelId) -> Option<&ModelForecast> {
        self.models.get(&id)
    }
}

/// Descriptive company information shown beside the forecast.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StockMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub all_time_high: Option<f64>,
    pub all_time_low: Option<f64>,
    pub about: Option<String>,
}
