//! Fetch probe
//!
//! Fetches one JSON resource through the fetch binding and the reqwest
//! client, then prints the settled state.
//!
//! ## Environment
//!
//! - `TETHER_PROBE_URL`: resource to fetch (required)
//! - `TETHER_CONFIG`: path to a JSON configuration file (optional)
//! - `TETHER_LOG`: trace, debug, info, warn or error (default: info)

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tether_core::bindings::Fetch;
use tether_core::{Mount, Platform, TetherConfig};
use tether_http::ReqwestHttpClient;
use tokio_stream::StreamExt;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeExitCode {
    /// The resource was fetched and decoded
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// The fetch settled with an error
    FetchFailed = 2,
}

impl From<ProbeExitCode> for ExitCode {
    fn from(code: ProbeExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn log_level() -> Level {
    match env::var("TETHER_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn load_config() -> Result<TetherConfig> {
    match env::var("TETHER_CONFIG") {
        Ok(path) => TetherConfig::from_file(&path)
            .with_context(|| format!("Failed to load configuration from {}", path)),
        Err(_) => Ok(TetherConfig::default()),
    }
}

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder().with_max_level(log_level()).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ProbeExitCode::ConfigError.into();
    }

    let Ok(url) = env::var("TETHER_PROBE_URL") else {
        eprintln!("TETHER_PROBE_URL is required");
        return ProbeExitCode::ConfigError.into();
    };

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ProbeExitCode::ConfigError.into();
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return ProbeExitCode::ConfigError.into();
        }
    };

    let local = tokio::task::LocalSet::new();
    match local.block_on(&runtime, probe(config, url)) {
        Ok(code) => code.into(),
        Err(e) => {
            error!("Probe failed: {:#}", e);
            ProbeExitCode::ConfigError.into()
        }
    }
}

async fn probe(config: TetherConfig, url: String) -> Result<ProbeExitCode> {
    let timeout = config.fetch.timeout() + Duration::from_secs(1);
    let client = ReqwestHttpClient::from_config(&config.fetch)?;
    let platform = client.install(Platform::from_config(config)?);

    info!(url = %url, "probing");
    let fetch = Mount::new(Fetch::<Value>::new(&platform, url))?;
    let mut changes = fetch.changes();
    tokio::time::timeout(timeout, async {
        while fetch.state().loading {
            changes.next().await;
        }
    })
    .await
    .context("Fetch did not settle in time")?;

    let state = fetch.state();
    match (state.data, state.error) {
        (Some(data), _) => {
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(ProbeExitCode::Success)
        }
        (None, Some(e)) => {
            error!(status = ?e.status(), "fetch failed: {}", e);
            Ok(ProbeExitCode::FetchFailed)
        }
        (None, None) => Ok(ProbeExitCode::FetchFailed),
    }
}
