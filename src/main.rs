//! CLI entry point for the weather rollup tool.
//!
//! Provides subcommands for refreshing the 12-hour snapshot from meteoblue,
//! aggregating a saved forecast document offline, and printing the snapshot.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use weather_rollup::{
    config::{MeteoblueConfig, api_key_from_env},
    fetch::{BasicClient, UrlParam},
    forecast::parse_forecast,
    output::print_json,
    rollup::NumericPolicy,
    service::WeatherService,
    store::{JsonFileStore, SnapshotStore},
};

#[derive(Parser)]
#[command(name = "weather_rollup")]
#[command(about = "Roll hourly weather forecasts up into 12-hour intervals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the forecast, aggregate it and merge the result into the snapshot
    Fetch {
        /// Snapshot file to merge the 12-hour data into
        #[arg(short, long, default_value = "weather_data.json")]
        store: PathBuf,

        /// Latitude of the forecast location
        #[arg(long, default_value_t = 47.56)]
        lat: f64,

        /// Longitude of the forecast location
        #[arg(long, default_value_t = 7.57)]
        lon: f64,

        /// Days of history to request
        #[arg(long, default_value_t = 4)]
        history_days: u32,

        /// Days of forecast to request
        #[arg(long, default_value_t = 5)]
        forecast_days: u32,

        /// Override the package base URL (e.g. a local mirror)
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Aggregate a forecast document saved on disk and print the 12-hour data
    Aggregate {
        /// Path to a forecast JSON document
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// Print the stored snapshot
    Show {
        /// Snapshot file to read
        #[arg(short, long, default_value = "weather_data.json")]
        store: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/weather_rollup.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("weather_rollup.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            store,
            lat,
            lon,
            history_days,
            forecast_days,
            base_url,
        } => {
            let mut config = MeteoblueConfig {
                lat,
                lon,
                history_days,
                forecast_days,
                ..Default::default()
            };
            if let Some(base_url) = base_url {
                config.base_url = base_url;
            }

            let url = config.request_url()?;
            let client = UrlParam::meteoblue(BasicClient::new()?, api_key_from_env()?);
            let service = WeatherService::new(client, JsonFileStore::new(&store), url.as_str());

            info!(url = %url, store = %store.display(), "Refreshing forecast");
            match service.refresh().await {
                Ok(report) => {
                    info!(intervals = report.twelve_hour_data.len(), "Snapshot updated");
                    print_json(&report)?;
                }
                Err(e) => {
                    error!(error = %e, status = %e.status(), "Refresh failed");
                    print_json(&e.to_response())?;
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Aggregate { input } => {
            let bytes = std::fs::read(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let forecast = parse_forecast(&bytes)?;
            let series = forecast.data_1h.aggregate(&NumericPolicy::default())?;

            info!(
                hourly_rows = forecast.data_1h.time.len(),
                intervals = series.len(),
                "Aggregated forecast file"
            );
            print_json(&series)?;
        }
        Commands::Show { store } => {
            let store = JsonFileStore::new(store);
            match store.get()? {
                Some(snapshot) => print_json(&snapshot)?,
                None => info!(path = %store.path().display(), "No snapshot stored yet"),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
