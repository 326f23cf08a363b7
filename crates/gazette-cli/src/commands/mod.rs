mod day_facts;
mod fetch_images;
mod feeds;

use std::time::{Duration, Instant};

use gazette_core::{FeedConfig, FeedService};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::{Envelope, Meta};

pub async fn run(cli: &Cli) -> Result<Envelope, CliError> {
    let feeds = build_service(cli)?;
    let started = Instant::now();

    let data: Value = match &cli.command {
        Command::FxLatest(args) => feeds::fx_latest(args, &feeds).await?,
        Command::FxRange(args) => feeds::fx_range(args, &feeds).await?,
        Command::CryptoPrices(args) => feeds::crypto_prices(args, &feeds).await?,
        Command::CryptoChart(args) => feeds::crypto_chart(args, &feeds).await?,
        Command::Holidays(args) => feeds::holidays(args, &feeds).await?,
        Command::DayFacts(args) => day_facts::run(args, &feeds).await?,
        Command::FetchImages(args) => fetch_images::run(args, &feeds).await?,
    };

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let meta = Meta::new(command_name(&cli.command), feeds.cache_mode(), latency_ms)?;

    Ok(Envelope { meta, data })
}

fn build_service(cli: &Cli) -> Result<FeedService, CliError> {
    let mut config = FeedConfig::from_env()?;
    if let Some(timeout_ms) = cli.timeout_ms {
        if timeout_ms == 0 {
            return Err(CliError::Command(String::from(
                "--timeout-ms must be greater than zero",
            )));
        }
        config = config.with_request_timeout(Duration::from_millis(timeout_ms));
    }
    if let Command::FetchImages(args) = &cli.command {
        config = fetch_images::job_config(args, config)?;
    }

    Ok(FeedService::from_config(config).with_cache_mode(cli.cache.into()))
}

const fn command_name(command: &Command) -> &'static str {
    match command {
        Command::FxLatest(_) => "fx-latest",
        Command::FxRange(_) => "fx-range",
        Command::CryptoPrices(_) => "crypto-prices",
        Command::CryptoChart(_) => "crypto-chart",
        Command::Holidays(_) => "holidays",
        Command::DayFacts(_) => "day-facts",
        Command::FetchImages(_) => "fetch-images",
    }
}
