//! Result reconciliation
//!
//! Merges the latest metadata and forecast outcomes into one renderable
//! [`ReconciledState`]. The state is recomputed from scratch on every pass.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{ChartKind, ForecastBundle, ForecastPoint, ModelId, StockMetadata, Symbol};
use crate::error::{ForecastError, Result};
use crate::outcome::RequestOutcome;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Chart image reference plus its cache-busting token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRef {
    pub model: ModelId,
    pub kind: ChartKind,
    /// Opaque reference handed out by the service
    pub reference: String,
    /// Wall-clock milliseconds of the reconciliation that produced this reference
    pub token: i64,
}

impl ChartRef {
    /// `reference?t=token`
    pub fn display_reference(&self) -> String {
        format!("{}?t={}", self.reference, self.token)
    }

    /// Absolute image URL: `<base>/graph/<reference>?t=<token>`
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| ForecastError::Config(format!("base URL '{base}' cannot carry path segments")))?
            .pop_if_empty()
            .push("graph")
            .push(&self.reference);
        url.set_query(Some(&format!("t={}", self.token)));
        Ok(url)
    }
}

/// Display data of one model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReconciledModel {
    pub series: Vec<ForecastPoint>,
    pub charts: BTreeMap<ChartKind, ChartRef>,
}

/// Everything the view is derived from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReconciledState {
    /// Symbol echoed by the service
    pub symbol: Option<Symbol>,
    pub current_price: Option<f64>,
    pub models: BTreeMap<ModelId, ReconciledModel>,
    pub metadata: Option<StockMetadata>,
    /// Metadata-scoped failure; never escalates to `error`
    pub metadata_error: Option<String>,
    /// Unified error; when set the view suppresses all forecast and metadata content
    pub error: Option<String>,
    pub forecast_pending: bool,
    pub metadata_pending: bool,
}

impl ReconciledState {
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn model(&self, id: ModelId) -> Option<&ReconciledModel> {
        self.models.get(&id)
    }

    /// Every chart reference in (model, kind) order.
    pub fn charts(&self) -> impl Iterator<Item = &ChartRef> {
        self.models.values().flat_map(|model| model.charts.values())
    }
}

/// Single-pass merge of both fetch outcomes.
///
/// `token` is the cache-busting value stamped on every chart reference of
/// this pass, normally the wall-clock milliseconds at which the forecast
/// outcome resolved.
pub fn reconcile(
    metadata: &RequestOutcome<Option<StockMetadata>>,
    forecast: &RequestOutcome<ForecastBundle>,
    token: i64,
) -> ReconciledState {
    let mut state = ReconciledState {
        forecast_pending: forecast.is_pending(),
        metadata_pending: metadata.is_pending(),
        ..ReconciledState::default()
    };

    match forecast {
        RequestOutcome::Failure(message) => {
            // clear-on-error: nothing from the bundle survives
            let message = if message.trim().is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                message.clone()
            };
            state.error = Some(message);
        }
        RequestOutcome::Success(bundle) => {
            state.symbol.clone_from(&bundle.symbol);
            state.current_price = bundle.current_price;
            state.models = bundle
                .models
                .iter()
                .map(|(id, forecast)| {
                    let charts = forecast
                        .charts
                        .iter()
                        .map(|(kind, reference)| {
                            let chart = ChartRef {
                                model: *id,
                                kind: *kind,
                                reference: reference.clone(),
                                token,
                            };
                            (*kind, chart)
                        })
                        .collect();
                    let model = ReconciledModel {
                        series: forecast.series.clone(),
                        charts,
                    };
                    (*id, model)
                })
                .collect();
        }
        RequestOutcome::Idle | RequestOutcome::Pending => {}
    }

    match metadata {
        RequestOutcome::Success(info) => state.metadata.clone_from(info),
        RequestOutcome::Failure(message) => state.metadata_error = Some(message.clone()),
        RequestOutcome::Idle | RequestOutcome::Pending => {}
    }

    state
}
