//! Provider adapters: URL construction plus typed parse-and-normalize for
//! each upstream payload.
//!
//! | Module | Provider | Output |
//! |--------|----------|--------|
//! | [`fx`] | Frankfurter | [`crate::FxRates`], [`crate::FxSeries`] |
//! | [`crypto`] | CoinGecko | [`crate::CryptoPrices`], [`crate::CryptoChart`] |
//! | [`holidays`] | Nager.Date | [`crate::Holiday`] lists |
//! | [`day_facts`] | Wikipedia "on this day", bundled dataset | [`crate::DayFact`] lists |
//! | [`commons`] | Wikimedia Commons search | [`crate::Candidate`]s |
//! | [`unsplash`] | Unsplash Source preview | [`crate::Candidate`]s |

pub mod commons;
pub mod crypto;
pub mod day_facts;
pub mod fx;
pub mod holidays;
pub mod unsplash;

pub use commons::CommonsSearch;
pub use crypto::CoinGeckoClient;
pub use day_facts::{stable_pick, CachedFacts, DatasetFacts, WikipediaFacts};
pub use fx::FrankfurterClient;
pub use holidays::NagerDateClient;
pub use unsplash::UnsplashSource;
