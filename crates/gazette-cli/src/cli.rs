//! CLI argument definitions for Gazette.
//!
//! One subcommand per feed read by the site, plus the offline image job
//! that picks and downloads a stock photo for each post.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fx-latest` | Latest exchange rates |
//! | `fx-range` | Daily exchange-rate series ending today |
//! | `crypto-prices` | Spot prices and 24h change for allow-listed coins |
//! | `crypto-chart` | Daily price series for one coin |
//! | `holidays` | Public holidays today plus the next one |
//! | `day-facts` | "On this day" facts |
//! | `fetch-images` | Batch image job over a posts file |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `8000` | Per-request timeout in ms |
//! | `--cache` | `use` | Cache mode (use, refresh, bypass) |
//!
//! # Examples
//!
//! ```bash
//! # Dollar against real and euro
//! gazette fx-latest --base USD --symbols BRL,EUR
//!
//! # Bitcoin chart for the last two weeks, skipping the cache
//! gazette crypto-chart bitcoin --days 14 --cache bypass
//!
//! # Images for two posts, Commons only
//! gazette fetch-images --posts posts.json --slugs copa,eleicoes --provider commons
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gazette_core::{CacheMode, ImageProviderMode};

/// Gazette - external feeds for a news site
///
/// Exchange rates, crypto prices, public holidays, "on this day" facts and
/// stock photos, with retries, caching and fallbacks.
#[derive(Debug, Parser)]
#[command(
    name = "gazette",
    author,
    version,
    about = "External feeds for a news site",
    long_about = "Gazette reads the third-party feeds a news site shows next to its \
articles and prints them as JSON. Features include:\n\
\n\
  • Input validation before any network call\n\
  • Retries with exponential backoff and Retry-After support\n\
  • Per-feed caching with TTLs\n\
  • Fallbacks from live feeds to a bundled dataset\n\
\n\
Logs go to stderr; set RUST_LOG to change verbosity.\n\
Use 'gazette <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-request timeout in milliseconds.
    ///
    /// Overrides GAZETTE_TIMEOUT_MS. Image search and downloads keep their
    /// own longer budgets.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Cache behavior for this run.
    #[arg(long, global = true, value_enum, default_value_t = CacheArg::Use)]
    pub cache: CacheArg,

    #[command(subcommand)]
    pub command: Command,
}

/// Cache mode options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheArg {
    /// Serve fresh entries, fetch and store on a miss.
    Use,
    /// Always fetch and overwrite the entry.
    Refresh,
    /// Always fetch, never store.
    Bypass,
}

impl From<CacheArg> for CacheMode {
    fn from(value: CacheArg) -> Self {
        match value {
            CacheArg::Use => CacheMode::Use,
            CacheArg::Refresh => CacheMode::Refresh,
            CacheArg::Bypass => CacheMode::Bypass,
        }
    }
}

/// Image provider options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderArg {
    /// Wikimedia Commons for every query, then an Unsplash preview.
    Auto,
    /// Wikimedia Commons only.
    Commons,
    /// Unsplash Source only.
    Unsplash,
}

impl From<ProviderArg> for ImageProviderMode {
    fn from(value: ProviderArg) -> Self {
        match value {
            ProviderArg::Auto => ImageProviderMode::Auto,
            ProviderArg::Commons => ImageProviderMode::Commons,
            ProviderArg::Unsplash => ImageProviderMode::Unsplash,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 💱 Fetch the latest exchange rates.
    ///
    /// # Examples
    ///
    ///   gazette fx-latest
    ///   gazette fx-latest --base EUR --symbols BRL,USD --pretty
    FxLatest(FxLatestArgs),

    /// 📈 Fetch a daily exchange-rate series ending today.
    ///
    /// The quote currency comes from GAZETTE_FX_QUOTE (default BRL).
    /// Days are clamped to 7..=60.
    ///
    /// # Examples
    ///
    ///   gazette fx-range --base USD --days 30
    FxRange(FxRangeArgs),

    /// 🪙 Fetch spot prices for allow-listed coins.
    ///
    /// # Examples
    ///
    ///   gazette crypto-prices
    ///   gazette crypto-prices --ids bitcoin,solana
    CryptoPrices(CryptoPricesArgs),

    /// 📊 Fetch a daily price series for one coin.
    ///
    /// # Examples
    ///
    ///   gazette crypto-chart ethereum --days 14
    CryptoChart(CryptoChartArgs),

    /// 🎉 Public holidays today plus the next upcoming one.
    ///
    /// # Examples
    ///
    ///   gazette holidays
    ///   gazette holidays --country PT
    Holidays(HolidaysArgs),

    /// 📅 "On this day" facts, falling back to a bundled dataset.
    ///
    /// # Examples
    ///
    ///   gazette day-facts
    ///   gazette day-facts --date 2025-03-08
    DayFacts(DayFactsArgs),

    /// 🖼️ Pick and download a stock photo for each post.
    ///
    /// Reads a JSON array of posts ({slug, title, category_slug?, has_image?}),
    /// writes {out-dir}/{slug}.jpg and appends one manifest line per post.
    ///
    /// # Examples
    ///
    ///   gazette fetch-images --posts posts.json --out-dir media/posts
    ///   gazette fetch-images --posts posts.json --replace --limit 5
    FetchImages(FetchImagesArgs),
}

/// Arguments for the `fx-latest` command.
#[derive(Debug, Args)]
pub struct FxLatestArgs {
    /// Base currency (3-letter ISO code, default USD).
    #[arg(long)]
    pub base: Option<String>,

    /// Comma-separated quote currencies; all when omitted.
    #[arg(long)]
    pub symbols: Option<String>,
}

/// Arguments for the `fx-range` command.
#[derive(Debug, Args)]
pub struct FxRangeArgs {
    /// Base currency (3-letter ISO code, default USD).
    #[arg(long)]
    pub base: Option<String>,

    /// Number of days, clamped to 7..=60.
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    pub days: i64,
}

/// Arguments for the `crypto-prices` command.
#[derive(Debug, Args)]
pub struct CryptoPricesArgs {
    /// Comma-separated coin ids; unknown ids are dropped.
    #[arg(long)]
    pub ids: Option<String>,
}

/// Arguments for the `crypto-chart` command.
#[derive(Debug, Args)]
pub struct CryptoChartArgs {
    /// Allow-listed coin id (e.g., bitcoin, ethereum).
    pub id: String,

    /// Number of days, clamped to 7..=60.
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    pub days: i64,
}

/// Arguments for the `holidays` command.
#[derive(Debug, Args)]
pub struct HolidaysArgs {
    /// 2-letter country code; GAZETTE_HOLIDAY_COUNTRY when omitted.
    #[arg(long)]
    pub country: Option<String>,
}

/// Arguments for the `day-facts` command.
#[derive(Debug, Args)]
pub struct DayFactsArgs {
    /// Calendar date as YYYY-MM-DD; today when omitted.
    #[arg(long)]
    pub date: Option<String>,
}

/// Arguments for the `fetch-images` command.
#[derive(Debug, Args)]
pub struct FetchImagesArgs {
    /// JSON file with the posts to process.
    #[arg(long)]
    pub posts: PathBuf,

    /// Directory receiving `{slug}.jpg` and `manifest.jsonl`.
    #[arg(long, default_value = "media/posts")]
    pub out_dir: PathBuf,

    /// Replace images of posts that already have one.
    #[arg(long, default_value_t = false)]
    pub replace: bool,

    /// Process at most this many posts.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Requested image width in pixels (64..=4096).
    #[arg(long, default_value_t = 1600)]
    pub width: u32,

    /// Seconds to wait between posts.
    #[arg(long, default_value_t = 1.2)]
    pub sleep: f64,

    /// Comma-separated slugs to restrict the run to.
    #[arg(long, value_delimiter = ',')]
    pub slugs: Vec<String>,

    /// Image provider selection.
    #[arg(long, value_enum, default_value_t = ProviderArg::Auto)]
    pub provider: ProviderArg,
}
