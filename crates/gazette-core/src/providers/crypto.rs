use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use time::OffsetDateTime;
use tracing::debug;

use crate::data_source::SourceError;
use crate::upstream::Upstream;
use crate::{CoinId, CryptoChart, CryptoPrices, NormalizedSeries, ProviderId};

/// CoinGecko public (keyless) API.
#[derive(Clone)]
pub struct CoinGeckoClient {
    upstream: Upstream,
    base_url: String,
    timeout: Duration,
}

impl CoinGeckoClient {
    pub fn new(upstream: Upstream, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            upstream,
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn prices_url(&self, ids: &[CoinId], vs: &[String]) -> String {
        format!(
            "{}/simple/price?ids={}&vs_currencies={}&include_24hr_change=true",
            self.base_url,
            join_ids(ids),
            vs.join(",")
        )
    }

    pub fn chart_url(&self, id: CoinId, vs: &str, days: u32) -> String {
        format!(
            "{}/coins/{id}/market_chart?vs_currency={vs}&days={days}&interval=daily",
            self.base_url
        )
    }

    pub async fn prices(&self, ids: &[CoinId], vs: &[String]) -> Result<CryptoPrices, SourceError> {
        let url = self.prices_url(ids, vs);
        let raw: BTreeMap<String, BTreeMap<String, Option<f64>>> = self
            .upstream
            .get_json(ProviderId::Coingecko, &url, self.timeout)
            .await?;
        Ok(normalize_prices(raw))
    }

    pub async fn chart(&self, id: CoinId, vs: &str, days: u32) -> Result<CryptoChart, SourceError> {
        let url = self.chart_url(id, vs, days);
        let raw: MarketChart = self
            .upstream
            .get_json(ProviderId::Coingecko, &url, self.timeout)
            .await?;
        normalize_chart(raw, id, vs, days)
    }
}

pub fn join_ids(ids: &[CoinId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<(f64, f64)>,
}

fn normalize_prices(raw: BTreeMap<String, BTreeMap<String, Option<f64>>>) -> CryptoPrices {
    let mut coins = BTreeMap::new();

    for (id, quotes) in raw {
        let Ok(coin) = id.parse::<CoinId>() else {
            debug!(id, "dropping coin outside the allow-list");
            continue;
        };
        let quotes = quotes
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key.to_ascii_lowercase(), value)))
            .collect();
        coins.insert(coin, quotes);
    }

    CryptoPrices { coins }
}

fn normalize_chart(
    raw: MarketChart,
    id: CoinId,
    vs: &str,
    days: u32,
) -> Result<CryptoChart, SourceError> {
    let mut points = Vec::with_capacity(raw.prices.len());

    for (epoch_ms, price) in raw.prices {
        let nanos = (epoch_ms * 1_000_000.0) as i128;
        let at = OffsetDateTime::from_unix_timestamp_nanos(nanos).map_err(|error| {
            SourceError::normalization(format!("coingecko timestamp {epoch_ms}: {error}"))
        })?;
        points.push((at.date(), price));
    }

    Ok(CryptoChart::new(
        id,
        vs,
        days,
        NormalizedSeries::from_points(points),
    ))
}
