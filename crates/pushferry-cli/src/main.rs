//! # Pushferry
//!
//! Pulls new Pushbullet messages, submits any torrent references they carry
//! to Transmission, and posts a confirmation for every accepted torrent.
//!
//! ## Usage
//!
//! ```sh,ignore
//! PUSHFERRY_PB_TOKEN=o.token pushferry pull --since 2024-05-01T12:00:00Z
//! ```

mod cli;
mod config;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pushferry_pipeline::{Pipeline, PushbulletClient, Resolver, TransmissionClient};
use pushferry_types::{Device, NotificationSource, NotifyError};

use crate::cli::{Cli, Command};
use crate::config::Config;

/// Initializes the tracing subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolve this service's device identity by nickname, registering a new
/// device when none exists yet. Idempotent across runs.
async fn ensure_device<S: NotificationSource>(
    source: &S,
    nickname: &str,
) -> Result<Device, NotifyError> {
    let devices = source.list_devices().await?;
    if let Some(device) = devices.into_iter().find(|d| d.nickname == nickname) {
        return Ok(device);
    }
    info!("No device named \"{nickname}\" found, registering one");
    source.create_device(nickname).await
}

async fn pull(config: &Config, args: &cli::PullArgs) -> Result<(), Box<dyn std::error::Error>> {
    let since = args.since_or_default();

    let source = PushbulletClient::new(&config.pushbullet_token)?;
    let sink = TransmissionClient::new(
        config.transmission_url.as_deref(),
        config.transmission_auth.clone(),
    )?;
    let resolver = Resolver::new()?;

    let device = ensure_device(&source, &config.device_nickname).await?;
    info!("Consuming messages for device \"{}\" ({})", device.nickname, device.id);

    let pipeline = Pipeline::new(source, sink, resolver, device.id);
    let report = pipeline.run_cycle(since).await?;

    match report.latest_modified {
        Some(watermark) => info!("Next watermark: {watermark}"),
        None => info!("No messages seen since {since}, watermark unchanged"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!("Loaded configuration {config:?}");

    match cli.command {
        Command::Pull(args) => pull(&config, &args).await,
    }
}
