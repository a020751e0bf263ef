//! View projection
//!
//! Pure function from [`ReconciledState`] to the artifacts a front end
//! renders. Nothing here touches the network or mutates state.

use chrono::NaiveDate;
use serde::Serialize;
use url::Url;

use crate::domain::{ChartKind, ModelId, StockMetadata};
use crate::engine::ReconciledState;

/// Top-of-page status line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum StatusBanner {
    Error(String),
    Loading,
}

impl StatusBanner {
    pub fn text(&self) -> &str {
        match self {
            Self::Error(message) => message,
            Self::Loading => "Predicting...",
        }
    }
}

/// Company information panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataPanel {
    pub title: String,
    /// Label/value pairs in display order; absent fields are omitted
    pub rows: Vec<(String, String)>,
    pub about: Option<String>,
}

/// One forecast day across all present models
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub date: NaiveDate,
    /// One value per column model, in `ForecastTable::models` order
    pub values: Vec<f64>,
}

/// Consolidated forecast table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastTable {
    pub title: String,
    pub headers: Vec<String>,
    pub models: Vec<ModelId>,
    pub rows: Vec<TableRow>,
}

/// One chart image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageBlock {
    pub model: ModelId,
    pub kind: ChartKind,
    pub title: String,
    pub alt: String,
    pub src: String,
}

/// Everything a front end renders for one state
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct View {
    pub status: Option<StatusBanner>,
    pub metadata_panel: Option<MetadataPanel>,
    /// Shown in place of the panel when the metadata lookup failed
    pub metadata_notice: Option<String>,
    pub price_banner: Option<String>,
    pub table: Option<ForecastTable>,
    pub images: Vec<ImageBlock>,
}

impl View {
    pub fn is_blank(&self) -> bool {
        self.metadata_panel.is_none()
            && self.price_banner.is_none()
            && self.table.is_none()
            && self.images.is_empty()
    }
}

/// Project a reconciled state into renderable artifacts.
///
/// `base_url` is the service root used to build absolute image URLs.
pub fn project(state: &ReconciledState, base_url: &Url) -> View {
    // the unified error suppresses everything else
    if let Some(error) = &state.error {
        return View {
            status: Some(StatusBanner::Error(error.clone())),
            ..View::default()
        };
    }

    View {
        status: state.forecast_pending.then_some(StatusBanner::Loading),
        metadata_panel: state.metadata.as_ref().map(metadata_panel),
        metadata_notice: state
            .metadata_error
            .as_ref()
            .map(|e| format!("Stock information unavailable: {e}")),
        price_banner: state
            .current_price
            .map(|price| format!("Current Stock Price: {price}")),
        table: forecast_table(state),
        images: image_blocks(state, base_url),
    }
}

fn forecast_table(state: &ReconciledState) -> Option<ForecastTable> {
    let models: Vec<ModelId> = state.models.keys().copied().collect();

    // shortest series bounds the rows so no index runs past a model's data
    let row_count = state.models.values().map(|m| m.series.len()).min()?;
    if row_count == 0 {
        return None;
    }

    let rows = (0..row_count)
        .map(|i| {
            let mut values = Vec::with_capacity(models.len());
            let mut date = None;
            for model in state.models.values() {
                let point = &model.series[i];
                date.get_or_insert(point.day());
                values.push(point.value);
            }
            TableRow {
                date: date.unwrap_or_default(),
                values,
            }
        })
        .collect();

    let mut headers = vec!["Date".to_string()];
    headers.extend(models.iter().map(|m| m.column_header().to_string()));

    Some(ForecastTable {
        title: format!("Forecasted Stock Prices for next {row_count} days"),
        headers,
        models,
        rows,
    })
}

fn image_blocks(state: &ReconciledState, base_url: &Url) -> Vec<ImageBlock> {
    state
        .charts()
        .map(|chart| ImageBlock {
            model: chart.model,
            kind: chart.kind,
            title: format!("{}: {}", chart.model.label(), chart.kind.title()),
            alt: format!("{} {}", chart.model.label(), chart.kind.alt()),
            src: chart
                .url(base_url)
                .map_or_else(|_| chart.display_reference(), |url| url.to_string()),
        })
        .collect()
}

/// Company panel for one metadata record
pub fn metadata_panel(info: &StockMetadata) -> MetadataPanel {
    let title = match (&info.name, &info.symbol) {
        (Some(name), Some(symbol)) => format!("{name} ({symbol})"),
        (Some(name), None) => name.clone(),
        (None, Some(symbol)) => symbol.clone(),
        (None, None) => "Company Information".to_string(),
    };

    let text_fields = [
        ("Exchange", &info.exchange),
        ("Sector", &info.sector),
        ("Industry", &info.industry),
    ];
    let mut rows: Vec<(String, String)> = text_fields
        .into_iter()
        .filter_map(|(label, value)| Some((label.to_string(), value.clone()?)))
        .collect();

    if let Some(cap) = info.market_cap {
        rows.push(("Market Cap".to_string(), humanize_amount(cap)));
    }
    let numeric_fields = [
        ("P/E Ratio", info.pe_ratio),
        ("All-Time High", info.all_time_high),
        ("All-Time Low", info.all_time_low),
    ];
    rows.extend(
        numeric_fields
            .into_iter()
            .filter_map(|(label, value)| Some((label.to_string(), format!("{:.2}", value?)))),
    );

    MetadataPanel {
        title,
        rows,
        about: info.about.clone(),
    }
}

/// `2.95T`, `812.40B`, `3.10M`, or the plain amount below a million.
pub fn humanize_amount(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastBundle, ForecastPoint, ModelForecast};
    use crate::engine::reconcile;
    use crate::outcome::RequestOutcome;

    fn base() -> Url {
        Url::parse("http://localhost:5000").unwrap()
    }

    fn series(start_day: u32, values: &[f64]) -> Vec<ForecastPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let date = NaiveDate::from_ymd_opt(2024, 5, start_day + i as u32)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .unwrap();
                ForecastPoint::new(date, *v)
            })
            .collect()
    }

    fn state_for(bundle: ForecastBundle, metadata: RequestOutcome<Option<StockMetadata>>) -> ReconciledState {
        reconcile(&metadata, &RequestOutcome::Success(bundle), 99)
    }

    #[test]
    fn test_rows_follow_shortest_series_positionally() {
        let bundle = ForecastBundle::new(190.5)
            .with_model(ModelForecast::new(ModelId::Lstm, series(1, &[1.0, 2.0, 3.0, 4.0])))
            .with_model(ModelForecast::new(ModelId::XgBoost, series(10, &[5.0, 6.0, 7.0])));

        let view = project(&state_for(bundle, RequestOutcome::Idle), &base());
        let table = view.table.unwrap();

        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.title, "Forecasted Stock Prices for next 3 days");
        // dates come from the first model; no date matching across models
        assert_eq!(table.rows[1].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(table.rows[1].values, vec![2.0, 6.0]);
        assert_eq!(table.headers, vec!["Date", "Forecast by LSTM", "Forecast by XGBoost"]);
    }

    #[test]
    fn test_combined_column_only_when_present() {
        let bundle = ForecastBundle::new(10.0)
            .with_model(ModelForecast::new(ModelId::Lstm, series(1, &[1.0, 2.0])))
            .with_model(ModelForecast::new(ModelId::XgBoost, series(1, &[3.0, 4.0])))
            .with_model(ModelForecast::new(ModelId::Combined, series(1, &[2.0, 3.0])));

        let table = project(&state_for(bundle, RequestOutcome::Idle), &base()).table.unwrap();
        assert_eq!(table.headers.last().map(String::as_str), Some("Final Forecast"));
        assert_eq!(table.rows[0].values, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_empty_series_means_no_table() {
        let bundle = ForecastBundle::new(10.0)
            .with_model(ModelForecast::new(ModelId::Lstm, series(1, &[1.0])))
            .with_model(ModelForecast::new(ModelId::XgBoost, Vec::new()));

        let view = project(&state_for(bundle, RequestOutcome::Idle), &base());
        assert!(view.table.is_none());
        assert_eq!(view.price_banner.as_deref(), Some("Current Stock Price: 10"));
    }

    #[test]
    fn test_images_carry_absolute_busted_urls() {
        let bundle = ForecastBundle::new(10.0).with_model(
            ModelForecast::new(ModelId::Lstm, series(1, &[1.0]))
                .with_chart(ChartKind::TrainingVsValidationLoss, "training_vs_validation_loss_lstm.png"),
        );

        let view = project(&state_for(bundle, RequestOutcome::Idle), &base());
        assert_eq!(view.images.len(), 1);
        assert_eq!(view.images[0].title, "LSTM: Training vs Validation Loss");
        assert_eq!(
            view.images[0].src,
            "http://localhost:5000/graph/training_vs_validation_loss_lstm.png?t=99"
        );
    }

    #[test]
    fn test_error_suppresses_everything() {
        let metadata = RequestOutcome::Success(Some(StockMetadata {
            name: Some("Apple Inc.".to_string()),
            ..StockMetadata::default()
        }));
        let state = reconcile(&metadata, &RequestOutcome::Failure("Symbol required".to_string()), 1);

        let view = project(&state, &base());
        assert_eq!(view.status, Some(StatusBanner::Error("Symbol required".to_string())));
        assert!(view.is_blank());
        assert!(view.metadata_notice.is_none());
    }

    #[test]
    fn test_loading_status_while_pending() {
        let state = reconcile(&RequestOutcome::Pending, &RequestOutcome::Pending, 1);
        let view = project(&state, &base());
        assert_eq!(view.status, Some(StatusBanner::Loading));
        assert_eq!(view.status.unwrap().text(), "Predicting...");
    }

    #[test]
    fn test_metadata_panel_rows() {
        let info = StockMetadata {
            name: Some("Apple Inc.".to_string()),
            symbol: Some("AAPL".to_string()),
            exchange: Some("NASDAQ".to_string()),
            market_cap: Some(2.95e12),
            pe_ratio: Some(29.4),
            about: Some("Designs consumer electronics.".to_string()),
            ..StockMetadata::default()
        };
        let state = state_for(ForecastBundle::new(1.0), RequestOutcome::Success(Some(info)));

        let panel = project(&state, &base()).metadata_panel.unwrap();
        assert_eq!(panel.title, "Apple Inc. (AAPL)");
        assert_eq!(
            panel.rows,
            vec![
                ("Exchange".to_string(), "NASDAQ".to_string()),
                ("Market Cap".to_string(), "2.95T".to_string()),
                ("P/E Ratio".to_string(), "29.40".to_string()),
            ]
        );
        assert!(panel.about.is_some());
    }

    #[test]
    fn test_metadata_failure_shows_notice_only() {
        let state = state_for(
            ForecastBundle::new(1.0),
            RequestOutcome::Failure("Error fetching data: timeout".to_string()),
        );
        let view = project(&state, &base());
        assert!(view.metadata_panel.is_none());
        assert_eq!(
            view.metadata_notice.as_deref(),
            Some("Stock information unavailable: Error fetching data: timeout")
        );
        assert!(view.status.is_none());
    }

    #[test]
    fn test_humanizes_amounts() {
        assert_eq!(humanize_amount(812.4e9), "812.40B");
        assert_eq!(humanize_amount(3.1e6), "3.10M");
        assert_eq!(humanize_amount(950.0), "950.00");
    }
}
