//! Downstream read operations.
//!
//! Each operation validates its input, builds a cache key covering every
//! parameter that affects the result, and on a miss calls the provider
//! adapter through the shared [`Upstream`] path.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::{debug, info, warn};

use crate::cache::{CacheMode, CacheStore};
use crate::clock::{Clock, SystemClock};
use crate::config::FeedConfig;
use crate::data_source::{FactSource, ImageSource, SourceError};
use crate::domain::iso_date_string;
use crate::fallback::{ChainOutcome, FallbackChain};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::pacing::Pacer;
use crate::providers::{
    crypto, fx, holidays, CachedFacts, CoinGeckoClient, CommonsSearch, DatasetFacts,
    FrankfurterClient, NagerDateClient, UnsplashSource, WikipediaFacts,
};
use crate::query_plan::{build_queries, QueryPlan};
use crate::retry::RetryExecutor;
use crate::upstream::Upstream;
use crate::validate;
use crate::{
    Candidate, CryptoChart, CryptoPrices, DayFacts, FxRates, FxSeries, Holiday, HolidaysToday,
    ProviderId,
};

/// Which stock-photo providers the image lookup may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageProviderMode {
    /// Commons for every query, then one Unsplash preview.
    #[default]
    Auto,
    Commons,
    Unsplash,
}

impl ImageProviderMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Commons => "commons",
            Self::Unsplash => "unsplash",
        }
    }
}

/// One step of the image fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttempt {
    pub provider: ProviderId,
    pub query: String,
}

/// Cached, validated access to every external data family.
#[derive(Clone)]
pub struct FeedService {
    config: FeedConfig,
    cache: CacheStore,
    cache_mode: CacheMode,
    clock: Arc<dyn Clock>,
    upstream: Upstream,
    fx: FrankfurterClient,
    crypto: CoinGeckoClient,
    holidays: NagerDateClient,
    wikipedia: Arc<dyn FactSource>,
    dataset: DatasetFacts,
    commons: CommonsSearch,
    unsplash: UnsplashSource,
    image_mode: ImageProviderMode,
}

impl FeedService {
    pub fn new(
        config: FeedConfig,
        http: Arc<dyn HttpClient>,
        cache: CacheStore,
        retry: RetryExecutor,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let upstream = Upstream::new(
            http,
            retry,
            Pacer::new(config.pacing),
            config.user_agent.clone(),
        );

        let timeout = config.request_timeout;
        let fx = FrankfurterClient::new(upstream.clone(), config.fx_base_url.clone(), timeout);
        let crypto = CoinGeckoClient::new(upstream.clone(), config.crypto_base_url.clone(), timeout);
        let holidays =
            NagerDateClient::new(upstream.clone(), config.holiday_base_url.clone(), timeout);
        let wikipedia: Arc<dyn FactSource> = Arc::new(WikipediaFacts::new(
            upstream.clone(),
            config.wiki_base_url.clone(),
            timeout,
        ));
        let commons = CommonsSearch::new(
            upstream.clone(),
            config.commons_api_url.clone(),
            config.search_timeout,
        );
        let unsplash = UnsplashSource::new(config.unsplash_base_url.clone());

        Self {
            config,
            cache,
            cache_mode: CacheMode::Use,
            clock,
            upstream,
            fx,
            crypto,
            holidays,
            wikipedia,
            dataset: DatasetFacts,
            commons,
            unsplash,
            image_mode: ImageProviderMode::Auto,
        }
    }

    /// Production wiring: reqwest transport, tokio sleeps, wall clock at the
    /// configured offset and a fresh in-memory cache.
    pub fn from_config(config: FeedConfig) -> Self {
        let retry = RetryExecutor::with_tokio(config.retry);
        let clock = Arc::new(SystemClock::new(config.utc_offset));
        Self::new(
            config,
            Arc::new(ReqwestHttpClient::new()),
            CacheStore::with_default_ttl(),
            retry,
            clock,
        )
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    pub fn with_image_mode(mut self, mode: ImageProviderMode) -> Self {
        self.image_mode = mode;
        self
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.cache_mode
    }

    pub fn image_mode(&self) -> ImageProviderMode {
        self.image_mode
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    /// Latest rates for `base` (default USD), optionally restricted to
    /// `symbols`.
    pub async fn get_fx_latest(
        &self,
        base: Option<&str>,
        symbols: Option<&str>,
    ) -> Result<FxRates, SourceError> {
        let base = validate::base_currency(base)?;
        let symbols = validate::currency_list(symbols)?;

        let listed = if symbols.is_empty() {
            String::from("ALL")
        } else {
            fx::join_codes(&symbols)
        };
        let key = format!("fx:latest:{base}:{listed}");

        self.cache
            .get_or_fetch_with_mode(&key, self.config.price_ttl, self.cache_mode, || {
                self.fx.latest(&base, &symbols)
            })
            .await
    }

    /// Daily `base`/quote series ending today, `days` clamped into [7, 60].
    pub async fn get_fx_range(&self, base: Option<&str>, days: i64) -> Result<FxSeries, SourceError> {
        let base = validate::base_currency(base)?;
        let quote = self.config.fx_quote.clone();
        let days = validate::clamp_days(days);

        let end = self.today();
        let start = end
            .checked_sub(time::Duration::days(i64::from(days) - 1))
            .ok_or_else(|| SourceError::internal(format!("{days}-day window before {end} underflows")))?;

        let key = format!("fx:range:{base}:{quote}:{days}:{}", iso_date_string(end));

        self.cache
            .get_or_fetch_with_mode(&key, self.config.price_ttl, self.cache_mode, || {
                self.fx.range(&base, &quote, start, end, days)
            })
            .await
    }

    /// Spot prices in the configured vs-currencies. Unknown ids are dropped.
    pub async fn get_crypto_prices(&self, ids: Option<&str>) -> Result<CryptoPrices, SourceError> {
        let ids = validate::coin_selection(ids);
        let vs = &self.config.crypto_vs;
        let key = format!("crypto:prices:{}:{}", crypto::join_ids(&ids), vs.join(","));

        self.cache
            .get_or_fetch_with_mode(&key, self.config.price_ttl, self.cache_mode, || {
                self.crypto.prices(&ids, vs)
            })
            .await
    }

    pub async fn get_crypto_chart(&self, id: &str, days: i64) -> Result<CryptoChart, SourceError> {
        let coin = validate::coin(id)?;
        let days = validate::clamp_days(days);
        let vs = self.config.chart_vs();
        let key = format!("crypto:chart:{coin}:{vs}:{days}");

        self.cache
            .get_or_fetch_with_mode(&key, self.config.price_ttl, self.cache_mode, || {
                self.crypto.chart(coin, vs, days)
            })
            .await
    }

    /// Holidays falling today plus the next upcoming one.
    ///
    /// A blank or absent country uses the configured default.
    pub async fn get_holidays_today(
        &self,
        country: Option<&str>,
    ) -> Result<HolidaysToday, SourceError> {
        let country = match country.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => validate::country(raw)?,
            None => self.config.holiday_country.clone(),
        };
        let today = self.today();
        let ttl = self.config.calendar_ttl;

        let year_key = format!("holidays:{country}:{}", today.year());
        let yearly: Vec<Holiday> = self
            .cache
            .get_or_fetch_with_mode(&year_key, ttl, self.cache_mode, || {
                self.holidays.public_holidays(today.year(), &country)
            })
            .await?;

        let next_key = format!("holidays:{country}:next");
        let upcoming: Vec<Holiday> = self
            .cache
            .get_or_fetch_with_mode(&next_key, ttl, self.cache_mode, || {
                self.holidays.next_public_holidays(&country)
            })
            .await?;

        Ok(HolidaysToday {
            today: holidays::holidays_on(&yearly, today),
            next: upcoming.into_iter().next(),
            country,
            date: today,
        })
    }

    /// "On this day" items: Wikipedia first, then the bundled dataset.
    ///
    /// Never fails; when every tier comes up empty the list is empty.
    pub async fn get_day_facts(&self, date: Date) -> DayFacts {
        let wikipedia = CachedFacts::new(
            Arc::clone(&self.wikipedia),
            self.cache.clone(),
            self.config.calendar_ttl,
            self.cache_mode,
        );

        let outcome = FallbackChain::select(
            [ProviderId::Wikipedia, ProviderId::Dataset],
            |provider| match provider {
                ProviderId::Wikipedia => wikipedia.facts(date),
                _ => self.dataset.facts(date),
            },
        )
        .await;

        match &outcome {
            ChainOutcome::Success { candidate, .. } => {
                debug!(date = %iso_date_string(date), provider = %candidate, "day facts selected");
            }
            ChainOutcome::Exhausted { attempts, .. } => {
                warn!(date = %iso_date_string(date), attempts, "no day facts available");
            }
        }

        DayFacts {
            date,
            items: outcome.into_items(),
        }
    }

    /// Ordered provider/query attempts for an image lookup.
    pub fn image_attempts(&self, title: &str, category_slug: Option<&str>) -> Vec<ImageAttempt> {
        let plan = build_queries(title, category_slug);
        let unsplash = ImageAttempt {
            provider: ProviderId::UnsplashSource,
            query: plan.single_query(title),
        };

        match self.image_mode {
            ImageProviderMode::Commons => commons_attempts(plan),
            ImageProviderMode::Unsplash => vec![unsplash],
            ImageProviderMode::Auto => {
                let mut attempts = commons_attempts(plan);
                attempts.push(unsplash);
                attempts
            }
        }
    }

    /// First usable stock photo for a post.
    ///
    /// Provider failures are retried, logged and downgraded; the result is
    /// `None` when nothing matched.
    pub async fn fetch_candidate_image(
        &self,
        title: &str,
        category_slug: Option<&str>,
        width: u32,
    ) -> Option<Candidate> {
        let width = width.clamp(validate::MIN_IMAGE_WIDTH, validate::MAX_IMAGE_WIDTH);
        let attempts = self.image_attempts(title, category_slug);
        let commons = &self.commons;
        let unsplash = &self.unsplash;

        let outcome = FallbackChain::select(attempts, |attempt| async move {
            let source: &dyn ImageSource = match attempt.provider {
                ProviderId::UnsplashSource => unsplash,
                _ => commons,
            };
            source.search(&attempt.query, width).await
        })
        .await;

        match outcome {
            ChainOutcome::Success {
                candidate, items, ..
            } => {
                debug!(provider = %candidate.provider, query = %candidate.query, "image candidate found");
                items.into_iter().next()
            }
            ChainOutcome::Exhausted { attempts, failures } => {
                let errors = failures.iter().filter(|failure| failure.error.is_some()).count();
                info!(title, attempts, errors, "no image candidate");
                None
            }
        }
    }

    /// Downloads the candidate's thumbnail bytes, with retries.
    pub async fn download_image(&self, candidate: &Candidate) -> Result<Vec<u8>, SourceError> {
        self.upstream
            .get_bytes(
                candidate.provider,
                &candidate.thumbnail_url,
                self.config.download_timeout,
            )
            .await
    }
}

fn commons_attempts(plan: QueryPlan) -> Vec<ImageAttempt> {
    plan.into_iter()
        .map(|query| ImageAttempt {
            provider: ProviderId::WikimediaCommons,
            query,
        })
        .collect()
}
