//! reqwest-backed prediction service client

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::api::{PredictionService, wire};
use crate::config::ClientConfig;
use crate::domain::{ForecastBundle, StockMetadata, Symbol};
use crate::engine::ChartRef;
use crate::error::{ForecastError, Result};

/// HTTP client for the prediction service
#[derive(Debug, Clone)]
pub struct HttpPredictionService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPredictionService {
    /// Create a client from a validated configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("forecast-core/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Create with a pre-built reqwest client
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ForecastError::Config(format!("base URL '{}' cannot carry path segments", self.base_url))
            })?
            .pop_if_empty()
            .push(path);
        Ok(url)
    }

    async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        let url = self.endpoint(path)?;
        debug!(%url, "POST");

        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        debug!(path, status, bytes = text.len(), "response received");
        wire::classify_response(status, &text)
    }
}

#[async_trait]
impl PredictionService for HttpPredictionService {
    async fn predict(&self, symbol: &Symbol, forecast_days: u32) -> Result<ForecastBundle> {
        let body = json!({
            "symbol": symbol.as_str(),
            "forecast_days": forecast_days,
        });

        let value = self.post_json("predict", body).await?;
        let bundle = wire::bundle_from_value(&value)?;

        info!(
            symbol = %symbol,
            forecast_days,
            models = bundle.models.len(),
            "forecast received"
        );
        Ok(bundle)
    }

    async fn stock_info(&self, symbol: &Symbol) -> Result<Option<StockMetadata>> {
        let value = self.post_json("stock-info", json!({ "symbol": symbol.as_str() })).await?;
        wire::metadata_from_value(&value)
    }

    async fn chart(&self, chart: &ChartRef) -> Result<Vec<u8>> {
        let url = chart.url(&self.base_url)?;
        debug!(%url, "GET chart");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            // error bodies are JSON like the other endpoints
            let text = String::from_utf8_lossy(&bytes);
            return Err(match wire::classify_response(status.as_u16(), &text) {
                Err(ForecastError::Transport(_)) | Ok(_) => {
                    ForecastError::Service(format!("HTTP {}", status.as_u16()))
                }
                Err(err) => err,
            });
        }

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartKind, ModelId};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one canned HTTP response and hand back the raw request text.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> (Url, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;

            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(request);
        });

        (Url::parse(&format!("http://{addr}")).unwrap(), rx)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0_u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(split) = text.find("\r\n\r\n") {
                let content_length = text[..split]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= split + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn service(base: Url) -> HttpPredictionService {
        // ambient proxy settings must not intercept loopback test servers
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpPredictionService::with_client(client, base)
    }

    #[test]
    fn test_new_validates_config() {
        let mut config = ClientConfig::default();
        assert!(HttpPredictionService::new(&config).is_ok());

        config.request_timeout = Duration::ZERO;
        assert!(matches!(
            HttpPredictionService::new(&config),
            Err(ForecastError::Config(_))
        ));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("https://example.test/ml/").unwrap();
        let service = HttpPredictionService::with_client(reqwest::Client::new(), base);
        assert_eq!(
            service.endpoint("stock-info").unwrap().as_str(),
            "https://example.test/ml/stock-info"
        );
    }

    #[tokio::test]
    async fn test_predict_posts_symbol_and_days() {
        let body = br#"{
            "current_price": 190.5,
            "lstm": {"forecast": [{"date": "2024-05-02 00:00:00", "value": 191.0}],
                     "graphs": {"forecasted_prices_lstm": "forecasted_prices_lstm.png"}},
            "xgboost": {"forecast": [{"date": "2024-05-02 00:00:00", "value": 190.0}], "graphs": {}}
        }"#;
        let (base, request) = serve_once("200 OK", "application/json", body.to_vec()).await;

        let bundle = service(base).predict(&Symbol::new("aapl"), 7).await.unwrap();
        assert_eq!(bundle.current_price, Some(190.5));
        assert_eq!(bundle.models.len(), 2);

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /predict "));
        assert!(request.contains(r#""symbol":"AAPL""#));
        assert!(request.contains(r#""forecast_days":7"#));
    }

    #[tokio::test]
    async fn test_service_error_body() {
        let (base, _) = serve_once(
            "400 Bad Request",
            "application/json",
            br#"{"error": "Stock symbol is required"}"#.to_vec(),
        )
        .await;

        let err = service(base).predict(&Symbol::new(""), 7).await.unwrap_err();
        assert!(matches!(err, ForecastError::Service(_)));
        assert_eq!(err.to_string(), "Stock symbol is required");
    }

    #[tokio::test]
    async fn test_non_json_is_transport_error() {
        let (base, _) =
            serve_once("200 OK", "text/html", b"<html>maintenance</html>".to_vec()).await;

        let err = service(base).predict(&Symbol::new("AAPL"), 7).await.unwrap_err();
        assert!(err.to_string().starts_with("Error fetching data: "));
    }

    #[tokio::test]
    async fn test_unreachable_is_transport_error() {
        // bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{addr}")).unwrap();
        let err = service(base).stock_info(&Symbol::new("AAPL")).await.unwrap_err();
        assert!(matches!(err, ForecastError::Transport(_)));
    }

    #[tokio::test]
    async fn test_stock_info_posts_symbol() {
        let (base, request) = serve_once(
            "200 OK",
            "application/json",
            br#"{"name": "Apple Inc.", "exchange": "NASDAQ", "marketCap": 2950000000000}"#.to_vec(),
        )
        .await;

        let info = service(base).stock_info(&Symbol::new("AAPL")).await.unwrap().unwrap();
        assert_eq!(info.exchange.as_deref(), Some("NASDAQ"));

        let request = request.await.unwrap();
        assert!(request.starts_with("POST /stock-info "));
    }

    #[tokio::test]
    async fn test_chart_fetch_carries_token() {
        let (base, request) = serve_once("200 OK", "image/png", vec![0x89, b'P', b'N', b'G']).await;

        let chart = ChartRef {
            model: ModelId::XgBoost,
            kind: ChartKind::ResidualsHistogram,
            reference: "residuals_histogram_xgboost.png".to_string(),
            token: 1_714_600_000_000,
        };
        let bytes = service(base).chart(&chart).await.unwrap();
        assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);

        let request = request.await.unwrap();
        assert!(request.starts_with("GET /graph/residuals_histogram_xgboost.png?t=1714600000000 "));
    }

    #[tokio::test]
    async fn test_chart_not_found() {
        let (base, _) = serve_once(
            "404 Not Found",
            "application/json",
            br#"{"error": "Graph not found"}"#.to_vec(),
        )
        .await;

        let chart = ChartRef {
            model: ModelId::Lstm,
            kind: ChartKind::ActualVsPredicted,
            reference: "missing.png".to_string(),
            token: 1,
        };
        let err = service(base).chart(&chart).await.unwrap_err();
        assert_eq!(err.to_string(), "Graph not found");
    }
}
