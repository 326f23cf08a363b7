//! # Domain Models
//!
//! Canonical shapes returned by every data family, independent of which
//! upstream produced them.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CurrencyCode`] | Validated 3-letter currency code |
//! | [`CountryCode`] | Validated 2-letter country code |
//! | [`CoinId`] | Allow-listed crypto asset identifier |
//! | [`NormalizedSeries`] | Date-ordered series, one point per date |
//! | [`FxRates`] / [`FxSeries`] | Latest FX rates and a daily FX series |
//! | [`CryptoPrices`] / [`CryptoChart`] | Spot prices and a daily price chart |
//! | [`HolidaysToday`] | Public holidays today plus the next one |
//! | [`DayFacts`] | "On this day" items with picked blurbs |
//! | [`Candidate`] | Stock-photo search hit |
//!
//! Dates are calendar dates and serialize as `YYYY-MM-DD`.

mod codes;
mod models;
mod series;

pub use codes::{CoinId, CountryCode, CurrencyCode};
pub use models::{
    Candidate, CryptoChart, CryptoPrices, DayFact, DayFacts, FactKind, FxRates, FxSeries,
    Holiday, HolidaysToday,
};
pub use series::{NormalizedSeries, SeriesPoint};

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

const ISO_DATE: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Formats `date` as `YYYY-MM-DD`.
pub fn iso_date_string(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(text: &str) -> Result<Date, time::error::Parse> {
    Date::parse(text, ISO_DATE)
}

/// Serde adapter for `YYYY-MM-DD` dates.
pub(crate) mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::iso_date_string(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        super::parse_iso_date(&text).map_err(serde::de::Error::custom)
    }
}
