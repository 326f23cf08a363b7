//! Runtime configuration for [`crate::FeedService`].
//!
//! Every field has a working default. `from_env` overrides them from
//! `GAZETTE_*` variables.

use std::time::Duration;

use time::UtcOffset;

use crate::{ConfigError, CountryCode, CurrencyCode, RetryPolicy};

pub const DEFAULT_USER_AGENT: &str = "gazette/0.1 (+https://github.com/gazette-rs/gazette)";

/// TTL for price and rate feeds.
pub const PRICE_TTL: Duration = Duration::from_secs(10 * 60);
/// TTL for holidays and day facts.
pub const CALENDAR_TTL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub user_agent: String,
    pub fx_base_url: String,
    pub crypto_base_url: String,
    pub holiday_base_url: String,
    pub wiki_base_url: String,
    pub commons_api_url: String,
    pub unsplash_base_url: String,
    pub request_timeout: Duration,
    pub search_timeout: Duration,
    pub download_timeout: Duration,
    pub price_ttl: Duration,
    pub calendar_ttl: Duration,
    pub retry: RetryPolicy,
    /// Minimum spacing between calls to one provider; zero disables pacing.
    pub pacing: Duration,
    pub holiday_country: CountryCode,
    /// Quote currency of the FX range series.
    pub fx_quote: CurrencyCode,
    /// Lower-case vs-currencies for crypto feeds; the chart uses the first.
    pub crypto_vs: Vec<String>,
    /// Offset used to compute "today".
    pub utc_offset: UtcOffset,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            user_agent: String::from(DEFAULT_USER_AGENT),
            fx_base_url: String::from("https://api.frankfurter.app"),
            crypto_base_url: String::from("https://api.coingecko.com/api/v3"),
            holiday_base_url: String::from("https://date.nager.at/api/v3"),
            wiki_base_url: wikipedia_base_url("pt"),
            commons_api_url: String::from("https://commons.wikimedia.org/w/api.php"),
            unsplash_base_url: String::from("https://source.unsplash.com"),
            request_timeout: Duration::from_secs(8),
            search_timeout: Duration::from_secs(10),
            download_timeout: Duration::from_secs(20),
            price_ttl: PRICE_TTL,
            calendar_ttl: CALENDAR_TTL,
            retry: RetryPolicy::default(),
            pacing: Duration::ZERO,
            holiday_country: CountryCode::from_static("BR"),
            fx_quote: CurrencyCode::from_static("BRL"),
            crypto_vs: vec![String::from("brl"), String::from("usd")],
            utc_offset: UtcOffset::from_hms(-3, 0, 0).unwrap_or(UtcOffset::UTC),
        }
    }
}

/// REST base URL of the Wikipedia edition for `language`.
pub fn wikipedia_base_url(language: &str) -> String {
    format!("https://{language}.wikipedia.org/api/rest_v1")
}

impl FeedConfig {
    /// Defaults overridden by `GAZETTE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(value) = var("GAZETTE_USER_AGENT") {
            config.user_agent = value;
        }
        if let Some(value) = var("GAZETTE_FX_BASE_URL") {
            config.fx_base_url = trim_url(value);
        }
        if let Some(value) = var("GAZETTE_CRYPTO_BASE_URL") {
            config.crypto_base_url = trim_url(value);
        }
        if let Some(value) = var("GAZETTE_HOLIDAY_BASE_URL") {
            config.holiday_base_url = trim_url(value);
        }
        if let Some(value) = var("GAZETTE_WIKIPEDIA_LANG") {
            let language = value.trim().to_ascii_lowercase();
            if !language.chars().all(|ch| ch.is_ascii_alphabetic() || ch == '-') {
                return Err(invalid("GAZETTE_WIKIPEDIA_LANG", value, "expected a language code"));
            }
            config.wiki_base_url = wikipedia_base_url(&language);
        }
        if let Some(value) = var("GAZETTE_WIKI_BASE_URL") {
            config.wiki_base_url = trim_url(value);
        }
        if let Some(value) = var("GAZETTE_COMMONS_API_URL") {
            config.commons_api_url = value;
        }
        if let Some(value) = var("GAZETTE_UNSPLASH_BASE_URL") {
            config.unsplash_base_url = trim_url(value);
        }
        if let Some(value) = var("GAZETTE_TIMEOUT_MS") {
            config.request_timeout = Duration::from_millis(parse_u64("GAZETTE_TIMEOUT_MS", &value)?);
        }
        if let Some(value) = var("GAZETTE_RETRY_ATTEMPTS") {
            let attempts = parse_u64("GAZETTE_RETRY_ATTEMPTS", &value)?;
            if attempts == 0 {
                return Err(ConfigError::ZeroAttempts);
            }
            config.retry.max_attempts = u32::try_from(attempts)
                .map_err(|_| invalid("GAZETTE_RETRY_ATTEMPTS", value, "too large"))?;
        }
        if let Some(value) = var("GAZETTE_RETRY_BASE_MS") {
            config.retry.base_delay =
                Duration::from_millis(parse_u64("GAZETTE_RETRY_BASE_MS", &value)?);
        }
        if let Some(value) = var("GAZETTE_PACING_MS") {
            config.pacing = Duration::from_millis(parse_u64("GAZETTE_PACING_MS", &value)?);
        }
        if let Some(value) = var("GAZETTE_HOLIDAY_COUNTRY") {
            config.holiday_country = CountryCode::parse(&value)?;
        }
        if let Some(value) = var("GAZETTE_FX_QUOTE") {
            config.fx_quote = CurrencyCode::parse(&value)?;
        }
        if let Some(value) = var("GAZETTE_CRYPTO_VS") {
            config.crypto_vs = parse_vs_currencies(&value)?;
        }
        if let Some(value) = var("GAZETTE_UTC_OFFSET_HOURS") {
            let hours = value
                .trim()
                .parse::<i8>()
                .map_err(|error| invalid("GAZETTE_UTC_OFFSET_HOURS", value.clone(), error))?;
            config.utc_offset = UtcOffset::from_hms(hours, 0, 0)
                .map_err(|error| invalid("GAZETTE_UTC_OFFSET_HOURS", value, error))?;
        }

        Ok(config)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// First crypto vs-currency, used by the chart.
    pub fn chart_vs(&self) -> &str {
        self.crypto_vs.first().map(String::as_str).unwrap_or("usd")
    }
}

fn trim_url(value: String) -> String {
    value.trim().trim_end_matches('/').to_owned()
}

fn parse_u64(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|error| invalid(name, value.to_owned(), error))
}

fn parse_vs_currencies(value: &str) -> Result<Vec<String>, ConfigError> {
    let mut out = Vec::new();
    for part in value.split(',').filter(|part| !part.trim().is_empty()) {
        let code = CurrencyCode::parse(part)?.as_str().to_ascii_lowercase();
        if !out.contains(&code) {
            out.push(code);
        }
    }
    if out.is_empty() {
        return Err(invalid("GAZETTE_CRYPTO_VS", value.to_owned(), "no currencies"));
    }
    Ok(out)
}

fn invalid(name: &'static str, value: String, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnv {
        name,
        value,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_match_public_endpoints() {
        let config = FeedConfig::default();
        assert_eq!(config.fx_base_url, "https://api.frankfurter.app");
        assert_eq!(config.wiki_base_url, "https://pt.wikipedia.org/api/rest_v1");
        assert_eq!(config.holiday_country.as_str(), "BR");
        assert_eq!(config.chart_vs(), "brl");
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = FeedConfig::from_lookup(lookup(&[
            ("GAZETTE_FX_BASE_URL", "http://localhost:9000/"),
            ("GAZETTE_WIKIPEDIA_LANG", "EN"),
            ("GAZETTE_TIMEOUT_MS", "1500"),
            ("GAZETTE_CRYPTO_VS", "usd,eur,usd"),
            ("GAZETTE_UTC_OFFSET_HOURS", "2"),
            ("GAZETTE_HOLIDAY_COUNTRY", "pt"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.fx_base_url, "http://localhost:9000");
        assert_eq!(config.wiki_base_url, "https://en.wikipedia.org/api/rest_v1");
        assert_eq!(config.request_timeout, Duration::from_millis(1500));
        assert_eq!(config.crypto_vs, ["usd", "eur"]);
        assert_eq!(config.utc_offset.whole_hours(), 2);
        assert_eq!(config.holiday_country.as_str(), "PT");
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = FeedConfig::from_lookup(lookup(&[("GAZETTE_TIMEOUT_MS", "  ")]))
            .expect("blank is ignored");
        assert_eq!(config.request_timeout, Duration::from_secs(8));
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = FeedConfig::from_lookup(lookup(&[("GAZETTE_TIMEOUT_MS", "soon")]))
            .expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                name: "GAZETTE_TIMEOUT_MS",
                ..
            }
        ));

        let err = FeedConfig::from_lookup(lookup(&[("GAZETTE_RETRY_ATTEMPTS", "0")]))
            .expect_err("must fail");
        assert_eq!(err, ConfigError::ZeroAttempts);

        let err = FeedConfig::from_lookup(lookup(&[("GAZETTE_FX_QUOTE", "REAL")]))
            .expect_err("must fail");
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn builders_replace_single_fields() {
        let retry = RetryPolicy::new(5, Duration::from_millis(250));
        let config = FeedConfig::default()
            .with_retry(retry)
            .with_request_timeout(Duration::from_secs(3))
            .with_pacing(Duration::from_millis(1_200));

        assert_eq!(config.retry, retry);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.pacing, Duration::from_millis(1_200));
        assert_eq!(config.search_timeout, Duration::from_secs(10));
    }
}
