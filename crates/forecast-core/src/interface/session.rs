//! Forecast session
//!
//! Owns the two request slots, dispatches fetches for each submission and
//! republishes the reconciled state after every resolution.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::PredictionService;
use crate::config::{ClientConfig, DispatchMode, StalePolicy};
use crate::domain::{ForecastBundle, InputState, StockMetadata};
use crate::engine::{Clock, ReconciledState, SystemClock, reconcile};
use crate::fetch::{ForecastFetcher, MetadataFetcher};
use crate::interface::view::{View, project};
use crate::outcome::RequestOutcome;

#[derive(Debug, Default)]
struct Slots {
    metadata: RequestOutcome<Option<StockMetadata>>,
    forecast: RequestOutcome<ForecastBundle>,
    metadata_generation: u64,
    forecast_generation: u64,
    /// Cache-busting token captured when the forecast last resolved
    token: i64,
}

struct SessionInner {
    metadata_fetcher: MetadataFetcher,
    forecast_fetcher: ForecastFetcher,
    config: ClientConfig,
    clock: Arc<dyn Clock>,
    slots: Mutex<Slots>,
    state_tx: watch::Sender<Arc<ReconciledState>>,
}

/// Client session driving one forecast screen.
///
/// Cloning is cheap and clones share the same slots, so several submissions
/// may be in flight at once. Which one's results survive is governed by the
/// configured [`StalePolicy`].
#[derive(Clone)]
pub struct ForecastSession {
    inner: Arc<SessionInner>,
}

impl ForecastSession {
    pub fn new(service: Arc<dyn PredictionService>, config: ClientConfig) -> Self {
        Self::with_clock(service, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        service: Arc<dyn PredictionService>,
        config: ClientConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state_tx, _) = watch::channel(Arc::new(ReconciledState::default()));
        Self {
            inner: Arc::new(SessionInner {
                metadata_fetcher: MetadataFetcher::new(Arc::clone(&service)),
                forecast_fetcher: ForecastFetcher::new(service),
                config,
                clock,
                slots: Mutex::new(Slots::default()),
                state_tx,
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Submit the input: dispatch both requests and wait for them to resolve.
    ///
    /// Returns the state published after this submission's last resolution.
    pub async fn predict(&self, input: &InputState) -> Arc<ReconciledState> {
        let symbol = input.symbol();
        let horizon = input.horizon().clone();

        let (metadata_generation, forecast_generation) = {
            let mut slots = self.lock();
            slots.metadata_generation += 1;
            slots.forecast_generation += 1;
            slots.metadata = RequestOutcome::Pending;
            slots.forecast = RequestOutcome::Pending;
            self.publish(&slots);
            (slots.metadata_generation, slots.forecast_generation)
        };

        info!(
            symbol = %symbol,
            horizon = %horizon,
            dispatch = ?self.inner.config.dispatch,
            generation = forecast_generation,
            "submitting forecast request"
        );

        let metadata = async {
            let outcome = self.inner.metadata_fetcher.fetch(&symbol).await;
            self.apply_metadata(metadata_generation, outcome);
        };
        let forecast = async {
            let outcome = self.inner.forecast_fetcher.fetch(&symbol, &horizon).await;
            self.apply_forecast(forecast_generation, outcome);
        };

        match self.inner.config.dispatch {
            DispatchMode::Sequential => {
                metadata.await;
                forecast.await;
            }
            DispatchMode::Concurrent => {
                futures::join!(metadata, forecast);
            }
        }

        self.state()
    }

    /// Latest published state
    pub fn state(&self) -> Arc<ReconciledState> {
        Arc::clone(&self.inner.state_tx.borrow())
    }

    /// Receiver notified on every republish
    pub fn subscribe(&self) -> watch::Receiver<Arc<ReconciledState>> {
        self.inner.state_tx.subscribe()
    }

    /// Project the latest state against the configured service root.
    pub fn view(&self) -> View {
        project(&self.state(), &self.inner.config.base_url)
    }

    pub fn metadata_outcome(&self) -> RequestOutcome<Option<StockMetadata>> {
        self.lock().metadata.clone()
    }

    pub fn forecast_outcome(&self) -> RequestOutcome<ForecastBundle> {
        self.lock().forecast.clone()
    }

    fn apply_metadata(&self, generation: u64, outcome: RequestOutcome<Option<StockMetadata>>) {
        let mut slots = self.lock();
        if self.is_stale(generation, slots.metadata_generation) {
            warn!(
                generation,
                current = slots.metadata_generation,
                "discarding stale metadata response"
            );
            return;
        }
        slots.metadata = outcome;
        self.publish(&slots);
    }

    fn apply_forecast(&self, generation: u64, outcome: RequestOutcome<ForecastBundle>) {
        let mut slots = self.lock();
        if self.is_stale(generation, slots.forecast_generation) {
            warn!(
                generation,
                current = slots.forecast_generation,
                "discarding stale forecast response"
            );
            return;
        }
        slots.forecast = outcome;
        slots.token = self.inner.clock.now_millis();
        self.publish(&slots);
    }

    fn is_stale(&self, generation: u64, current: u64) -> bool {
        match self.inner.config.stale_policy {
            StalePolicy::DiscardStale => generation != current,
            StalePolicy::LastResolvedWins => false,
        }
    }

    fn publish(&self, slots: &Slots) {
        let state = reconcile(&slots.metadata, &slots.forecast, slots.token);
        debug!(
            error = state.error.as_deref(),
            models = state.models.len(),
            forecast_pending = state.forecast_pending,
            metadata_pending = state.metadata_pending,
            "publishing reconciled state"
        );
        self.inner.state_tx.send_replace(Arc::new(state));
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
