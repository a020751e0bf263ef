//! # Domain Models
//!
//! Data held and exchanged by the forecast client.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Normalized ticker |
//! | [`InputState`] | User-entered symbol and horizon |
//! | [`ForecastHorizon`] | Coerced day count, or the invalid raw text |
//! | [`ForecastPoint`] | One forecast day and price |
//! | [`ModelForecast`] | Series and chart references of one model |
//! | [`ForecastBundle`] | Complete multi-model forecast response |
//! | [`StockMetadata`] | Company information sidecar |

mod input;
mod models;
mod symbol;

pub use input::{DEFAULT_FORECAST_DAYS, ForecastHorizon, InputState};
pub use models::{
    ChartKind, ForecastBundle, ForecastPoint, ModelForecast, ModelId, StockMetadata,
    parse_forecast_date,
};
pub use symbol::Symbol;
