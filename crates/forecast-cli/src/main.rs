//! Command-line front end for the forecast client

mod cli;
mod commands;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use forecast_core::HttpPredictionService;
use forecast_utils::{LogConfig, init_tracing};
use tracing::info;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout carries the rendered view
    init_tracing(&LogConfig::from_env());

    let cli = Cli::parse();
    let config = commands::resolve_config(&cli)?;
    info!(base_url = %config.base_url, "starting forecast client");

    let service = Arc::new(HttpPredictionService::new(&config)?);
    commands::run(&cli, config, service).await
}
