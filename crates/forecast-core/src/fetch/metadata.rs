//! Company metadata lookup

use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::PredictionService;
use crate::domain::{StockMetadata, Symbol};
use crate::outcome::RequestOutcome;

/// Issues the company metadata lookup for a symbol
#[derive(Clone)]
pub struct MetadataFetcher {
    service: Arc<dyn PredictionService>,
}

impl MetadataFetcher {
    pub fn new(service: Arc<dyn PredictionService>) -> Self {
        Self { service }
    }

    pub async fn fetch(&self, symbol: &Symbol) -> RequestOutcome<Option<StockMetadata>> {
        debug!(symbol = %symbol, "fetching stock info");

        let result = self.service.stock_info(symbol).await;
        if let Err(e) = &result {
            warn!(symbol = %symbol, error = %e, "stock info lookup failed");
        }

        RequestOutcome::from_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPredictionService;
    use crate::error::ForecastError;

    #[tokio::test]
    async fn test_success_and_absent() {
        let mut mock = MockPredictionService::new();
        mock.expect_stock_info()
            .withf(|symbol| symbol.as_str() == "AAPL")
            .times(1)
            .returning(|_| {
                Ok(Some(StockMetadata {
                    name: Some("Apple Inc.".to_string()),
                    ..StockMetadata::default()
                }))
            });
        mock.expect_stock_info()
            .withf(|symbol| symbol.as_str() == "ZZZZ")
            .returning(|_| Ok(None));

        let fetcher = MetadataFetcher::new(Arc::new(mock));

        let outcome = fetcher.fetch(&Symbol::new("aapl")).await;
        let info = outcome.success().cloned().flatten().unwrap();
        assert_eq!(info.name.as_deref(), Some("Apple Inc."));

        let outcome = fetcher.fetch(&Symbol::new("zzzz")).await;
        assert_eq!(outcome, RequestOutcome::Success(None));
    }

    #[tokio::test]
    async fn test_failure_becomes_outcome() {
        let mut mock = MockPredictionService::new();
        mock.expect_stock_info()
            .returning(|_| Err(ForecastError::Transport("connection refused".to_string())));

        let outcome = MetadataFetcher::new(Arc::new(mock)).fetch(&Symbol::new("AAPL")).await;
        assert_eq!(outcome.failure(), Some("Error fetching data: connection refused"));
    }
}
