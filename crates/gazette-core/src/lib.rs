//! # Gazette Core
//!
//! Resilient, cached access to the third-party feeds a news site shows next
//! to its articles: exchange rates, crypto prices, public holidays, "on this
//! day" facts and stock photos.
//!
//! ## Overview
//!
//! - **Validation** of every request parameter before any network call
//! - **Retry executor** with exponential backoff and `Retry-After` support
//! - **Cache-aside store** with per-entry TTL
//! - **Provider adapters** that parse each payload into a canonical shape
//! - **Fallback chains** over ordered candidate sources
//! - **Query construction** for stock-photo search
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Cache-aside store and cache modes |
//! | [`clock`] | Source of "today" |
//! | [`config`] | Base URLs, timeouts, TTLs and defaults |
//! | [`data_source`] | Error taxonomy and provider seams |
//! | [`domain`] | Canonical models and validated codes |
//! | [`error`] | Validation and configuration errors |
//! | [`fallback`] | First-success candidate chains |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`pacing`] | Per-provider call spacing |
//! | [`providers`] | Frankfurter, CoinGecko, Nager.Date, Wikipedia, Commons, Unsplash |
//! | [`query_plan`] | Image search queries from a post title |
//! | [`retry`] | Retry policy and executor |
//! | [`service`] | [`FeedService`], the downstream read operations |
//! | [`source`] | Provider identifiers |
//! | [`upstream`] | Shared request path with status classification |
//! | [`validate`] | Input normalization and allow-lists |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gazette_core::{FeedConfig, FeedService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let feeds = FeedService::from_config(FeedConfig::from_env()?);
//!
//!     let rates = feeds.get_fx_latest(Some("usd"), Some("BRL,EUR")).await?;
//!     println!("{:?}", rates.rates);
//!
//!     let facts = feeds.get_day_facts(feeds.today()).await;
//!     println!("{} facts", facts.items.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Job      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  FeedService    │────▶│ Cache-Aside Store│
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Fallback Chain  │────▶│ Provider Adapter │
//! └─────────────────┘     └────────┬─────────┘
//!                                  │
//!                                  ▼
//!                         ┌──────────────────┐
//!                         │ Upstream         │
//!                         │ (pacer, retry,   │
//!                         │  HTTP client)    │
//!                         └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns a [`SourceError`] whose kind tells the caller what
//! to do next:
//!
//! ```rust
//! use gazette_core::{SourceError, SourceErrorKind};
//!
//! fn handle_error(error: SourceError) {
//!     match error.kind() {
//!         SourceErrorKind::InvalidRequest => {
//!             // Report to user
//!         }
//!         SourceErrorKind::RateLimited | SourceErrorKind::Transient => {
//!             // Retries were exhausted; try again later
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fallback;
pub mod http_client;
pub mod pacing;
pub mod providers;
pub mod query_plan;
pub mod retry;
pub mod service;
pub mod source;
pub mod upstream;
pub mod validate;

// Caching
pub use cache::{CacheMode, CacheStore};

// Clock
pub use clock::{Clock, FixedClock, SystemClock};

// Configuration
pub use config::FeedConfig;

// Error taxonomy and provider seams
pub use data_source::{FactSource, ImageSource, SourceError, SourceErrorKind};

// Domain models
pub use domain::{
    Candidate, CoinId, CountryCode, CryptoChart, CryptoPrices, CurrencyCode, DayFact, DayFacts,
    FactKind, FxRates, FxSeries, Holiday, HolidaysToday, NormalizedSeries, SeriesPoint,
};

// Error types
pub use error::{ConfigError, ValidationError};

// Fallback chains
pub use fallback::{ChainFailure, ChainOutcome, FallbackChain};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
    ScriptedHttpClient,
};

// Pacing
pub use pacing::Pacer;

// Query construction
pub use query_plan::{build_queries, QueryPlan};

// Retry logic
pub use retry::{RecordingSleeper, RetryExecutor, RetryPolicy, Sleeper, TokioSleeper};

// Downstream service
pub use service::{FeedService, ImageAttempt, ImageProviderMode};

// Source identifiers
pub use source::ProviderId;

// Shared request path
pub use upstream::Upstream;
