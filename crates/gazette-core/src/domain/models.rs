use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::Date;

use super::iso_date;
use crate::{CoinId, CountryCode, CurrencyCode, NormalizedSeries, ProviderId, SeriesPoint};

const MAX_ARTIST_CHARS: usize = 120;

static HTML_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"<[^>]*>").ok());

/// Latest reference rates for one base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxRates {
    pub base: CurrencyCode,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub rates: BTreeMap<CurrencyCode, f64>,
}

/// Daily rate of `base` quoted in `quote`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxSeries {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
    pub days: u32,
    pub series: NormalizedSeries<f64>,
    pub current: Option<SeriesPoint<f64>>,
}

impl FxSeries {
    pub fn new(
        base: CurrencyCode,
        quote: CurrencyCode,
        days: u32,
        series: NormalizedSeries<f64>,
    ) -> Self {
        let current = series.current().cloned();
        Self {
            base,
            quote,
            days,
            series,
            current,
        }
    }
}

/// Spot prices per coin, keyed `{vs}` and `{vs}_24h_change`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CryptoPrices {
    pub coins: BTreeMap<CoinId, BTreeMap<String, f64>>,
}

impl CryptoPrices {
    pub fn price(&self, coin: CoinId, vs: &str) -> Option<f64> {
        self.coins.get(&coin)?.get(vs).copied()
    }

    pub fn change_24h(&self, coin: CoinId, vs: &str) -> Option<f64> {
        self.coins
            .get(&coin)?
            .get(&format!("{vs}_24h_change"))
            .copied()
    }
}

/// Daily closing price of one coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoChart {
    pub id: CoinId,
    pub vs: String,
    pub days: u32,
    pub series: NormalizedSeries<f64>,
    pub current: Option<SeriesPoint<f64>>,
}

impl CryptoChart {
    pub fn new(id: CoinId, vs: impl Into<String>, days: u32, series: NormalizedSeries<f64>) -> Self {
        let current = series.current().cloned();
        Self {
            id,
            vs: vs.into(),
            days,
            series,
            current,
        }
    }
}

/// One public holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub local_name: String,
    pub name: String,
    pub country: CountryCode,
    pub global: bool,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidaysToday {
    pub country: CountryCode,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub today: Vec<Holiday>,
    pub next: Option<Holiday>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactKind {
    /// Commemorative date.
    Observance,
    /// Public holiday.
    Holiday,
    /// Historical event.
    Event,
}

impl FactKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Observance => "observance",
            Self::Holiday => "holiday",
            Self::Event => "event",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFact {
    pub kind: FactKind,
    pub title: String,
    pub about: String,
    pub summary: String,
    pub source: ProviderId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFacts {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub items: Vec<DayFact>,
}

/// A stock-photo hit, with whatever licensing metadata the provider exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub provider: ProviderId,
    /// Provider-side identifier, e.g. the Commons `File:` page title.
    pub source_id: String,
    pub thumbnail_url: String,
    pub description_url: Option<String>,
    pub license: Option<String>,
    pub author: Option<String>,
    pub attribution_required: bool,
    /// Query that produced this hit.
    pub query: String,
}

impl Candidate {
    /// Human-readable credit stored next to a downloaded image.
    pub fn credit_line(&self) -> String {
        let mut bits = Vec::new();

        match self.provider {
            ProviderId::WikimediaCommons => {
                bits.push(String::from("Wikimedia Commons"));
                bits.push(format!("file={}", self.source_id));
                if let Some(url) = &self.description_url {
                    bits.push(url.clone());
                }
                if let Some(license) = &self.license {
                    bits.push(format!("license={license}"));
                }
                if let Some(artist) = self.author.as_deref().map(clean_artist) {
                    if !artist.is_empty() {
                        bits.push(format!("artist={artist}"));
                    }
                }
            }
            ProviderId::UnsplashSource => {
                bits.push(String::from("Unsplash Source (preview)"));
                bits.push(format!("query={}", self.query));
                bits.push(format!("url={}", self.thumbnail_url));
            }
            other => {
                bits.push(other.to_string());
                bits.push(format!("url={}", self.thumbnail_url));
            }
        }

        format!("Imagem: {}", bits.join(" | "))
    }
}

/// Strips markup, collapses whitespace and caps the length.
fn clean_artist(raw: &str) -> String {
    let text = match HTML_TAG.as_ref() {
        Some(tag) => tag.replace_all(raw, " ").into_owned(),
        None => raw.to_owned(),
    };
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_ARTIST_CHARS).collect()
}
