//! Thin wrappers around the [`FeedService`] read operations.

use gazette_core::FeedService;
use serde_json::Value;

use crate::cli::{CryptoChartArgs, CryptoPricesArgs, FxLatestArgs, FxRangeArgs, HolidaysArgs};
use crate::error::CliError;

pub async fn fx_latest(args: &FxLatestArgs, feeds: &FeedService) -> Result<Value, CliError> {
    let rates = feeds
        .get_fx_latest(args.base.as_deref(), args.symbols.as_deref())
        .await?;
    Ok(serde_json::to_value(rates)?)
}

pub async fn fx_range(args: &FxRangeArgs, feeds: &FeedService) -> Result<Value, CliError> {
    let series = feeds.get_fx_range(args.base.as_deref(), args.days).await?;
    Ok(serde_json::to_value(series)?)
}

pub async fn crypto_prices(args: &CryptoPricesArgs, feeds: &FeedService) -> Result<Value, CliError> {
    let prices = feeds.get_crypto_prices(args.ids.as_deref()).await?;
    Ok(serde_json::to_value(prices)?)
}

pub async fn crypto_chart(args: &CryptoChartArgs, feeds: &FeedService) -> Result<Value, CliError> {
    let chart = feeds.get_crypto_chart(&args.id, args.days).await?;
    Ok(serde_json::to_value(chart)?)
}

pub async fn holidays(args: &HolidaysArgs, feeds: &FeedService) -> Result<Value, CliError> {
    let holidays = feeds.get_holidays_today(args.country.as_deref()).await?;
    Ok(serde_json::to_value(holidays)?)
}
