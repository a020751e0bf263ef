//! Multi-model stock price forecast client
//!
//! This crate talks to a remote prediction service that trains several
//! forecasting models per request, and turns its answers into something a
//! front end can render. It includes:
//!
//! - Input handling with lenient numeric coercion of the forecast horizon
//! - Metadata and forecast fetchers that never fail, only resolve
//! - A reconciler that merges both outcomes and stamps chart references
//!   with a cache-busting token
//! - A pure view projector (status, price, table, charts, company panel)
//!
//! # Architecture
//!
//! [`ForecastSession`] owns the two request slots. Each submission
//! dispatches the [`MetadataFetcher`] and [`ForecastFetcher`] (sequentially
//! or concurrently, per [`DispatchMode`]), republishes a
//! [`ReconciledState`] after every resolution and drops stale responses
//! according to [`StalePolicy`]. The network boundary is the
//! [`PredictionService`] trait; [`HttpPredictionService`] is the reqwest
//! implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use forecast_core::{ClientConfig, ForecastSession, HttpPredictionService, InputState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::default().with_env_overrides()?;
//!     let service = Arc::new(HttpPredictionService::new(&config)?);
//!     let session = ForecastSession::new(service, config);
//!
//!     session.predict(&InputState::from_text("AAPL", "7")).await;
//!     if let Some(table) = session.view().table {
//!         println!("{}", table.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod interface;
pub mod outcome;

// Re-export main types for convenience
pub use api::{HttpPredictionService, PredictionService};
pub use config::{ClientConfig, DispatchMode, StalePolicy};
pub use domain::{
    ChartKind, ForecastBundle, ForecastHorizon, ForecastPoint, InputState, ModelForecast, ModelId,
    StockMetadata, Symbol,
};
pub use engine::{ChartRef, Clock, ReconciledState, SystemClock, reconcile};
pub use error::{ForecastError, Result};
pub use fetch::{ForecastFetcher, MetadataFetcher};
pub use interface::{ForecastSession, View, project};
pub use outcome::RequestOutcome;
