use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use time::Date;

use crate::data_source::SourceError;
use crate::domain::{iso_date_string, parse_iso_date};
use crate::upstream::Upstream;
use crate::{CurrencyCode, FxRates, FxSeries, NormalizedSeries, ProviderId};

/// Frankfurter reference-rate API.
#[derive(Clone)]
pub struct FrankfurterClient {
    upstream: Upstream,
    base_url: String,
    timeout: Duration,
}

impl FrankfurterClient {
    pub fn new(upstream: Upstream, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            upstream,
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn latest_url(&self, base: &CurrencyCode, symbols: &[CurrencyCode]) -> String {
        let mut url = format!("{}/latest?from={base}", self.base_url);
        if !symbols.is_empty() {
            url.push_str("&to=");
            url.push_str(&join_codes(symbols));
        }
        url
    }

    pub fn range_url(&self, base: &CurrencyCode, quote: &CurrencyCode, start: Date, end: Date) -> String {
        format!(
            "{}/{}..{}?from={base}&to={quote}",
            self.base_url,
            iso_date_string(start),
            iso_date_string(end)
        )
    }

    pub async fn latest(
        &self,
        base: &CurrencyCode,
        symbols: &[CurrencyCode],
    ) -> Result<FxRates, SourceError> {
        let url = self.latest_url(base, symbols);
        let raw: FrankfurterLatest = self
            .upstream
            .get_json(ProviderId::Frankfurter, &url, self.timeout)
            .await?;
        normalize_latest(raw)
    }

    /// Daily `base`/`quote` series for the inclusive `[start, end]` window.
    pub async fn range(
        &self,
        base: &CurrencyCode,
        quote: &CurrencyCode,
        start: Date,
        end: Date,
        days: u32,
    ) -> Result<FxSeries, SourceError> {
        let url = self.range_url(base, quote, start, end);
        let raw: FrankfurterRange = self
            .upstream
            .get_json(ProviderId::Frankfurter, &url, self.timeout)
            .await?;
        normalize_range(raw, base.clone(), quote.clone(), days)
    }
}

/// Comma-joined codes, as used in URLs and cache keys.
pub fn join_codes(codes: &[CurrencyCode]) -> String {
    codes
        .iter()
        .map(CurrencyCode::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Debug, Deserialize)]
struct FrankfurterLatest {
    base: String,
    date: String,
    rates: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct FrankfurterRange {
    rates: BTreeMap<String, BTreeMap<String, f64>>,
}

fn normalize_latest(raw: FrankfurterLatest) -> Result<FxRates, SourceError> {
    let base = CurrencyCode::parse(&raw.base).map_err(shape_error)?;
    let date = parse_date(&raw.date)?;

    let mut rates = BTreeMap::new();
    for (code, rate) in raw.rates {
        rates.insert(CurrencyCode::parse(&code).map_err(shape_error)?, rate);
    }

    Ok(FxRates { base, date, rates })
}

fn normalize_range(
    raw: FrankfurterRange,
    base: CurrencyCode,
    quote: CurrencyCode,
    days: u32,
) -> Result<FxSeries, SourceError> {
    let mut points = Vec::with_capacity(raw.rates.len());

    for (day, rates) in raw.rates {
        let date = parse_date(&day)?;
        let rate = rates.get(quote.as_str()).copied().ok_or_else(|| {
            SourceError::normalization(format!("frankfurter range is missing {quote} on {day}"))
        })?;
        points.push((date, rate));
    }

    Ok(FxSeries::new(
        base,
        quote,
        days,
        NormalizedSeries::from_points(points),
    ))
}

fn parse_date(text: &str) -> Result<Date, SourceError> {
    parse_iso_date(text)
        .map_err(|error| SourceError::normalization(format!("frankfurter date '{text}': {error}")))
}

fn shape_error(error: crate::ValidationError) -> SourceError {
    SourceError::normalization(format!("frankfurter payload: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;

    fn code(raw: &str) -> CurrencyCode {
        CurrencyCode::parse(raw).expect("valid code")
    }

    #[test]
    fn normalizes_latest_payload() {
        let raw: FrankfurterLatest = serde_json::from_str(
            r#"{"amount":1.0,"base":"USD","date":"2025-06-02","rates":{"BRL":5.61,"EUR":0.88}}"#,
        )
        .expect("payload");

        let rates = normalize_latest(raw).expect("normalized");
        assert_eq!(rates.base, code("USD"));
        assert_eq!(rates.rates.get(&code("BRL")), Some(&5.61));
        assert_eq!(rates.rates.len(), 2);
    }

    #[test]
    fn latest_rejects_bad_dates() {
        let raw: FrankfurterLatest =
            serde_json::from_str(r#"{"base":"USD","date":"02/06/2025","rates":{}}"#).expect("payload");
        let err = normalize_latest(raw).expect_err("bad date");
        assert_eq!(err.kind(), SourceErrorKind::Normalization);
    }

    #[test]
    fn range_is_sorted_and_current_is_latest() {
        let raw: FrankfurterRange = serde_json::from_str(
            r#"{"rates":{"2025-06-03":{"BRL":5.7},"2025-06-01":{"BRL":5.5},"2025-06-02":{"BRL":5.6}}}"#,
        )
        .expect("payload");

        let series = normalize_range(raw, code("USD"), code("BRL"), 7).expect("normalized");
        let values: Vec<f64> = series.series.points().iter().map(|p| p.value).collect();
        assert_eq!(values, vec![5.5, 5.6, 5.7]);
        assert_eq!(series.current.map(|p| p.value), Some(5.7));
    }

    #[test]
    fn range_requires_quote_on_every_date() {
        let raw: FrankfurterRange =
            serde_json::from_str(r#"{"rates":{"2025-06-01":{"EUR":0.9}}}"#).expect("payload");
        let err = normalize_range(raw, code("USD"), code("BRL"), 7).expect_err("missing quote");
        assert_eq!(err.kind(), SourceErrorKind::Normalization);
    }
}
