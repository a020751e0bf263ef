//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use forecast_core::domain::DEFAULT_FORECAST_DAYS;

#[derive(Debug, Parser)]
#[command(
    name = "forecast",
    version,
    about = "Multi-model stock price forecasts from a prediction service"
)]
pub struct Cli {
    /// Prediction service root URL (overrides FORECAST_API_BASE)
    #[arg(long, global = true)]
    pub api_base: Option<String>,

    /// Per-request timeout in seconds (overrides FORECAST_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tables for terminal display
    Table,
    /// The projected view as JSON
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast prices for a symbol
    Predict(PredictArgs),
    /// Show company information only
    Info {
        /// Ticker symbol
        symbol: String,
    },
    /// Interactive loop reading `<SYMBOL> [DAYS]` lines
    Shell(DispatchArgs),
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    /// Ticker symbol
    pub symbol: String,

    /// Days to forecast
    #[arg(long, default_value_t = DEFAULT_FORECAST_DAYS.to_string())]
    pub days: String,

    /// Download every chart into this directory
    #[arg(long, value_name = "DIR")]
    pub save_charts: Option<PathBuf>,

    #[command(flatten)]
    pub dispatch: DispatchArgs,
}

#[derive(Debug, Clone, Copy, Default, Args)]
pub struct DispatchArgs {
    /// Issue the metadata and forecast requests at the same time
    #[arg(long)]
    pub concurrent: bool,

    /// Apply responses in arrival order even when a newer request exists
    #[arg(long)]
    pub last_resolved_wins: bool,
}
