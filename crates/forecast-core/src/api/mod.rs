//! Prediction service boundary
//!
//! [`PredictionService`] is the async seam between the client and the
//! external HTTP API; [`HttpPredictionService`] is the production
//! implementation and [`wire`] normalizes its payloads.

pub mod client;
pub mod wire;

use async_trait::async_trait;

use crate::domain::{ForecastBundle, StockMetadata, Symbol};
use crate::engine::ChartRef;
use crate::error::Result;

pub use client::HttpPredictionService;

/// Operations offered by the prediction service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// `POST /predict`: multi-model forecast for `forecast_days` days
    async fn predict(&self, symbol: &Symbol, forecast_days: u32) -> Result<ForecastBundle>;

    /// `POST /stock-info`: company metadata, `None` when the service has none
    async fn stock_info(&self, symbol: &Symbol) -> Result<Option<StockMetadata>>;

    /// `GET /graph/{reference}?t={token}`: rendered chart image bytes
    async fn chart(&self, chart: &ChartRef) -> Result<Vec<u8>>;
}
