//! Request-parameter normalization applied before any upstream call.

use crate::{CoinId, CountryCode, CurrencyCode, ValidationError};

/// Maximum number of symbols or coin ids forwarded in one upstream call.
pub const MAX_LIST_LEN: usize = 10;

pub const MIN_DAYS: u32 = 7;
pub const MAX_DAYS: u32 = 60;
pub const DEFAULT_DAYS: u32 = 30;

pub const MIN_IMAGE_WIDTH: u32 = 64;
pub const MAX_IMAGE_WIDTH: u32 = 4096;

/// Base currency; absent or blank input defaults to USD.
pub fn base_currency(raw: Option<&str>) -> Result<CurrencyCode, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(CurrencyCode::usd()),
        Some(value) => CurrencyCode::parse(value),
    }
}

/// Comma-separated target currencies.
///
/// Every entry must be valid. Duplicates are dropped preserving order and the
/// list is capped at [`MAX_LIST_LEN`]. An empty result means "all".
pub fn currency_list(raw: Option<&str>) -> Result<Vec<CurrencyCode>, ValidationError> {
    let mut out: Vec<CurrencyCode> = Vec::new();

    for part in raw.unwrap_or_default().split(',') {
        if part.trim().is_empty() {
            continue;
        }
        let code = CurrencyCode::parse(part)?;
        if !out.contains(&code) {
            out.push(code);
        }
    }

    out.truncate(MAX_LIST_LEN);
    Ok(out)
}

/// Comma-separated coin ids filtered through the allow-list.
///
/// Unknown ids are dropped silently; an empty selection falls back to
/// bitcoin and ethereum.
pub fn coin_selection(raw: Option<&str>) -> Vec<CoinId> {
    let mut out: Vec<CoinId> = Vec::new();

    for part in raw.unwrap_or_default().split(',') {
        if let Ok(coin) = part.parse::<CoinId>() {
            if !out.contains(&coin) {
                out.push(coin);
            }
        }
    }

    if out.is_empty() {
        out = vec![CoinId::Bitcoin, CoinId::Ethereum];
    }

    out.truncate(MAX_LIST_LEN);
    out
}

/// Single coin id; unknown ids are rejected.
pub fn coin(raw: &str) -> Result<CoinId, ValidationError> {
    raw.parse()
}

pub fn country(raw: &str) -> Result<CountryCode, ValidationError> {
    CountryCode::parse(raw)
}

/// Clamps a day range into `[MIN_DAYS, MAX_DAYS]`.
pub fn clamp_days(days: i64) -> u32 {
    days.clamp(i64::from(MIN_DAYS), i64::from(MAX_DAYS)) as u32
}

/// Parses and clamps raw day-range text; unparsable input uses [`DEFAULT_DAYS`].
pub fn parse_days(raw: Option<&str>) -> u32 {
    let days = raw
        .map(str::trim)
        .and_then(|text| text.parse::<i64>().ok())
        .unwrap_or(i64::from(DEFAULT_DAYS));
    clamp_days(days)
}

pub fn image_width(width: u32) -> Result<u32, ValidationError> {
    if !(MIN_IMAGE_WIDTH..=MAX_IMAGE_WIDTH).contains(&width) {
        return Err(ValidationError::InvalidImageWidth {
            value: width,
            min: MIN_IMAGE_WIDTH,
            max: MAX_IMAGE_WIDTH,
        });
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn base_defaults_to_usd() {
        assert_eq!(base_currency(None).expect("default"), CurrencyCode::usd());
        assert_eq!(base_currency(Some("  ")).expect("default"), CurrencyCode::usd());
        assert_eq!(base_currency(Some("eur")).expect("valid").as_str(), "EUR");
        assert!(base_currency(Some("EURO")).is_err());
    }

    #[test]
    fn currency_list_dedups_and_truncates() {
        let parsed = currency_list(Some("brl, eur,BRL,,gbp")).expect("valid list");
        let codes: Vec<&str> = parsed.iter().map(CurrencyCode::as_str).collect();
        assert_eq!(codes, ["BRL", "EUR", "GBP"]);

        let many = "AAA,BBB,CCC,DDD,EEE,FFF,GGG,HHH,III,JJJ,KKK,LLL";
        assert_eq!(currency_list(Some(many)).expect("valid").len(), MAX_LIST_LEN);
        assert!(currency_list(None).expect("empty").is_empty());
    }

    #[test]
    fn currency_list_rejects_any_invalid_entry() {
        let err = currency_list(Some("BRL,R$")).expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::InvalidCurrency {
                value: String::from("R$")
            }
        );
    }

    #[test]
    fn coin_selection_filters_through_allow_list() {
        assert_eq!(
            coin_selection(Some("Solana,shib,solana, cardano")),
            vec![CoinId::Solana, CoinId::Cardano]
        );
        assert_eq!(
            coin_selection(Some("shib,pepe")),
            vec![CoinId::Bitcoin, CoinId::Ethereum]
        );
        assert_eq!(coin_selection(None), vec![CoinId::Bitcoin, CoinId::Ethereum]);
    }

    #[test]
    fn single_coin_rejects_unknown() {
        assert_eq!(coin("ripple"), Ok(CoinId::Ripple));
        assert!(matches!(coin("../etc"), Err(ValidationError::UnknownCoin { .. })));
    }

    #[test]
    fn days_are_clamped() {
        assert_eq!(clamp_days(-5), 7);
        assert_eq!(clamp_days(99_999), 60);
        assert_eq!(clamp_days(14), 14);
    }

    proptest! {
        #[test]
        fn prop_clamped_days_stay_in_window(days in any::<i64>()) {
            prop_assert!((MIN_DAYS..=MAX_DAYS).contains(&clamp_days(days)));
        }

        #[test]
        fn prop_days_inside_window_are_unchanged(days in 7i64..=60) {
            prop_assert_eq!(i64::from(clamp_days(days)), days);
        }
    }

    #[test]
    fn unparsable_days_use_default() {
        assert_eq!(parse_days(None), DEFAULT_DAYS);
        assert_eq!(parse_days(Some("")), DEFAULT_DAYS);
        assert_eq!(parse_days(Some("a week")), DEFAULT_DAYS);
        assert_eq!(parse_days(Some(" 3 ")), 7);
        assert_eq!(parse_days(Some("90")), 60);
    }

    #[test]
    fn image_width_bounds() {
        assert_eq!(image_width(1600), Ok(1600));
        assert!(image_width(10).is_err());
        assert!(image_width(10_000).is_err());
    }
}
