//! Multi-model forecast request

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::PredictionService;
use crate::domain::{ForecastBundle, ForecastHorizon, Symbol};
use crate::error::ForecastError;
use crate::outcome::RequestOutcome;

/// Issues the forecast request for a symbol and horizon
#[derive(Clone)]
pub struct ForecastFetcher {
    service: Arc<dyn PredictionService>,
}

impl ForecastFetcher {
    pub fn new(service: Arc<dyn PredictionService>) -> Self {
        Self { service }
    }

    /// Fetch the bundle. The result is all-or-nothing: any transport or
    /// service error fails the whole bundle.
    ///
    /// An invalid horizon is rejected here without a network call.
    pub async fn fetch(
        &self,
        symbol: &Symbol,
        horizon: &ForecastHorizon,
    ) -> RequestOutcome<ForecastBundle> {
        let days = match horizon {
            ForecastHorizon::Days(days) => *days,
            ForecastHorizon::Invalid(raw) => {
                warn!(symbol = %symbol, raw = %raw, "rejecting invalid forecast horizon");
                return RequestOutcome::Failure(
                    ForecastError::InvalidHorizon { raw: raw.clone() }.to_string(),
                );
            }
        };

        debug!(symbol = %symbol, days, "fetching forecast");

        let result = self.service.predict(symbol, days).await;
        if let Err(e) = &result {
            warn!(symbol = %symbol, days, error = %e, "forecast request failed");
        }

        RequestOutcome::from_result(result)
    }
}
