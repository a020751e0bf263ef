//! Subcommand execution

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use forecast_core::domain::DEFAULT_FORECAST_DAYS;
use forecast_core::interface::{StatusBanner, metadata_panel};
use forecast_core::{
    ClientConfig, DispatchMode, ForecastHorizon, ForecastSession, InputState, MetadataFetcher, PredictionService,
    RequestOutcome, StalePolicy, Symbol, View,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use url::Url;

use crate::cli::{Cli, Command, DispatchArgs, OutputFormat, PredictArgs};
use crate::render;

/// Resolve configuration: defaults, then environment, then flags.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::default()
        .with_env_overrides()
        .context("invalid environment configuration")?;

    if let Some(base) = &cli.api_base {
        config.base_url = Url::parse(base).with_context(|| format!("invalid --api-base '{base}'"))?;
    }
    if let Some(secs) = cli.timeout_secs {
        config.request_timeout = std::time::Duration::from_secs(secs);
    }

    let dispatch = match &cli.command {
        Command::Predict(args) => args.dispatch,
        Command::Shell(args) => *args,
        Command::Info { .. } => DispatchArgs::default(),
    };
    if dispatch.concurrent {
        config.dispatch = DispatchMode::Concurrent;
    }
    if dispatch.last_resolved_wins {
        config.stale_policy = StalePolicy::LastResolvedWins;
    }

    config.validate()?;
    Ok(config)
}

pub async fn run(
    cli: &Cli,
    config: ClientConfig,
    service: Arc<dyn PredictionService>,
) -> anyhow::Result<ExitCode> {
    match &cli.command {
        Command::Predict(args) => predict(args, cli.format, config, service).await,
        Command::Info { symbol } => info_only(symbol, cli.format, service).await,
        Command::Shell(_) => shell(cli.format, config, service).await,
    }
}

async fn predict(
    args: &PredictArgs,
    format: OutputFormat,
    config: ClientConfig,
    service: Arc<dyn PredictionService>,
) -> anyhow::Result<ExitCode> {
    let session = ForecastSession::new(Arc::clone(&service), config);
    let input = InputState::from_text(args.symbol.as_str(), &args.days);

    session.predict(&input).await;
    let view = session.view();
    println!("{}", render::render(&view, format)?);

    if let (Some(dir), None) = (&args.save_charts, &view.status) {
        let saved = save_charts(&session, service.as_ref(), dir).await?;
        eprintln!("Saved {saved} chart(s) to {}", dir.display());
    }

    Ok(exit_code(&view))
}

async fn info_only(
    symbol: &str,
    format: OutputFormat,
    service: Arc<dyn PredictionService>,
) -> anyhow::Result<ExitCode> {
    let symbol = Symbol::new(symbol);
    let outcome = MetadataFetcher::new(service).fetch(&symbol).await;

    match outcome {
        RequestOutcome::Success(Some(metadata)) => {
            let panel = metadata_panel(&metadata);
            match format {
                OutputFormat::Table => println!("{}", render::render_panel(&panel)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&panel)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        RequestOutcome::Success(None) => {
            println!("No information available for {symbol}");
            Ok(ExitCode::SUCCESS)
        }
        RequestOutcome::Failure(message) => {
            eprintln!("Error: {message}");
            Ok(ExitCode::FAILURE)
        }
        RequestOutcome::Idle | RequestOutcome::Pending => Ok(ExitCode::FAILURE),
    }
}

/// One session for the whole loop, so each line replaces the previous view.
async fn shell(
    format: OutputFormat,
    config: ClientConfig,
    service: Arc<dyn PredictionService>,
) -> anyhow::Result<ExitCode> {
    let session = ForecastSession::new(service, config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"forecast> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(input) = parse_shell_line(&line) else {
            continue;
        };
        if matches!(input.symbol_text(), "quit" | "exit") {
            break;
        }

        session.predict(&input).await;
        println!("{}\n", render::render(&session.view(), format)?);
    }

    Ok(ExitCode::SUCCESS)
}

/// `<SYMBOL> [DAYS]`; blank lines yield nothing.
pub fn parse_shell_line(line: &str) -> Option<InputState> {
    let mut parts = line.split_whitespace();
    let symbol = parts.next()?;
    let input = match parts.next() {
        Some(days) => InputState::from_text(symbol, days),
        None => InputState::new(symbol, ForecastHorizon::Days(DEFAULT_FORECAST_DAYS)),
    };
    Some(input)
}

async fn save_charts(
    session: &ForecastSession,
    service: &dyn PredictionService,
    dir: &Path,
) -> anyhow::Result<usize> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;

    let state = session.state();
    let mut saved = 0;
    for chart in state.charts() {
        let path = dir.join(format!("{}_{}.png", chart.model.as_str(), chart.kind.key()));
        match service.chart(chart).await {
            Ok(bytes) => {
                tokio::fs::write(&path, bytes)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?;
                info!(path = %path.display(), "saved chart");
                saved += 1;
            }
            Err(e) => warn!(reference = %chart.reference, error = %e, "chart download failed"),
        }
    }
    Ok(saved)
}

fn exit_code(view: &View) -> ExitCode {
    match view.status {
        Some(StatusBanner::Error(_)) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}
