//! Service payload normalization
//!
//! Turns raw `/predict` and `/stock-info` bodies into domain types. Graph keys
//! carry a per-model suffix on the wire (`forecasted_prices_lstm`); they are
//! mapped onto [`ChartKind`] here so nothing downstream depends on key names.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{ChartKind, ForecastBundle, ForecastPoint, ModelForecast, ModelId, StockMetadata, Symbol};
use crate::error::{ForecastError, Result};

/// Wire key of each model's section in the `/predict` response
const MODEL_KEYS: [(ModelId, &str); 3] = [
    (ModelId::Lstm, "lstm"),
    (ModelId::XgBoost, "xgboost"),
    (ModelId::Combined, "combined_forecast"),
];

#[derive(Debug, Deserialize)]
struct ModelPayload {
    #[serde(default)]
    forecast: Vec<ForecastPoint>,
    #[serde(default)]
    graphs: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataPayload {
    #[serde(default, deserialize_with = "lenient_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    exchange: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    sector: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    industry: Option<String>,
    #[serde(default, alias = "market_cap", deserialize_with = "lenient_number")]
    market_cap: Option<f64>,
    #[serde(default, alias = "pe_ratio", deserialize_with = "lenient_number")]
    pe_ratio: Option<f64>,
    #[serde(default, alias = "all_time_high", deserialize_with = "lenient_number")]
    all_time_high: Option<f64>,
    #[serde(default, alias = "all_time_low", deserialize_with = "lenient_number")]
    all_time_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    about: Option<String>,
}

impl From<MetadataPayload> for StockMetadata {
    fn from(payload: MetadataPayload) -> Self {
        Self {
            name: payload.name,
            symbol: payload.symbol,
            exchange: payload.exchange,
            sector: payload.sector,
            industry: payload.industry,
            market_cap: payload.market_cap,
            pe_ratio: payload.pe_ratio,
            all_time_high: payload.all_time_high,
            all_time_low: payload.all_time_low,
            about: payload.about,
        }
    }
}

/// Classify a raw response body.
///
/// A non-empty `error` field wins regardless of status; a non-JSON body is a
/// transport failure; any other non-2xx status becomes a service error.
pub fn classify_response(status: u16, body: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        ForecastError::Transport(format!("invalid JSON response (HTTP {status}): {e}"))
    })?;

    if let Some(message) = service_error(&value) {
        return Err(ForecastError::Service(message));
    }

    if !(200..300).contains(&status) {
        return Err(ForecastError::Service(format!("HTTP {status}")));
    }

    Ok(value)
}

fn service_error(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.is_empty() => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

/// Normalize a successful `/predict` body into a bundle.
///
/// Models that are missing or malformed are left out of the bundle rather
/// than failing the whole response.
pub fn bundle_from_value(value: &Value) -> Result<ForecastBundle> {
    let Some(object) = value.as_object() else {
        return Err(ForecastError::Decode(format!(
            "expected a JSON object from /predict, got {}",
            json_kind(value)
        )));
    };

    let mut bundle = ForecastBundle {
        symbol: object
            .get("symbol")
            .and_then(Value::as_str)
            .map(Symbol::new),
        current_price: object.get("current_price").and_then(Value::as_f64),
        models: BTreeMap::new(),
    };

    for (model, key) in MODEL_KEYS {
        let Some(section) = object.get(key).filter(|v| !v.is_null()) else {
            debug!(model = model.as_str(), "model absent from forecast payload");
            continue;
        };

        match ModelPayload::deserialize(section) {
            Ok(payload) => {
                bundle.models.insert(model, normalize_model(model, payload));
            }
            Err(e) => {
                warn!(model = model.as_str(), error = %e, "dropping malformed model section");
            }
        }
    }

    Ok(bundle)
}

fn normalize_model(model: ModelId, payload: ModelPayload) -> ModelForecast {
    let suffix = format!("_{}", model.as_str());
    let mut forecast = ModelForecast::new(model, payload.forecast);

    for (key, reference) in payload.graphs {
        let stem = key.strip_suffix(&suffix).unwrap_or(&key);
        let reference = match reference {
            Value::String(reference) if !reference.is_empty() => reference,
            _ => {
                debug!(model = model.as_str(), key = %key, "ignoring empty graph reference");
                continue;
            }
        };

        match ChartKind::from_key(stem) {
            Some(kind) => {
                forecast.charts.insert(kind, reference);
            }
            None => debug!(model = model.as_str(), key = %key, "ignoring unknown graph key"),
        }
    }

    forecast
}

/// Normalize a successful `/stock-info` body; `null` means no metadata.
pub fn metadata_from_value(value: &Value) -> Result<Option<StockMetadata>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(_) => MetadataPayload::deserialize(value)
            .map(|payload| Some(payload.into()))
            .map_err(|e| ForecastError::Decode(format!("stock info: {e}"))),
        other => Err(ForecastError::Decode(format!(
            "expected a JSON object from /stock-info, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) if !text.trim().is_empty() => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}
