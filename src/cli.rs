//! Command-line interface parsing for the currency rate shell
//!
//! The shell itself is menu driven; the flags here only configure it: where
//! the cache file lives, how long it stays fresh, and which currencies get a
//! rate table of their own. Configuration is resolved once at startup and
//! threaded explicitly through the rest of the program.

use clap::Parser;
use directories::ProjectDirs;
use std::path::PathBuf;
use std::time::Duration;

use crate::data::FAVORITE_CURRENCIES;

/// File name used for the cache when no --cache-file is given
const DEFAULT_CACHE_FILE: &str = "currency_rate.json";

/// Currency rate cache - look up, list and convert exchange rates
#[derive(Parser, Debug)]
#[command(name = "fxrate")]
#[command(about = "Interactive currency lookup and conversion over a local rate cache")]
#[command(version)]
pub struct Cli {
    /// Path of the JSON cache file
    ///
    /// Defaults to currency_rate.json in the XDG cache directory
    /// (~/.cache/fxrate/ on Linux), or the working directory when no home
    /// directory can be determined.
    #[arg(long, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// Maximum cache age in hours before a refresh is forced
    #[arg(long, value_name = "HOURS", default_value_t = 24)]
    pub max_age_hours: u64,

    /// Currency code to track with a full rate table (repeatable)
    ///
    /// Defaults to USD, EUR, GBP and RUB. Codes are upper-cased.
    #[arg(long = "currency", value_name = "CODE")]
    pub currencies: Vec<String>,
}

/// Resolved configuration threaded through the application
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the JSON cache file
    pub cache_path: PathBuf,
    /// Freshness window for the cache file
    pub max_age: Duration,
    /// Upper-cased currency codes that get their own rate table
    pub tracked: Vec<String>,
}

impl Config {
    /// Builds a Config from parsed CLI arguments, filling in defaults.
    pub fn from_cli(cli: &Cli) -> Self {
        let cache_path = cli
            .cache_file
            .clone()
            .unwrap_or_else(default_cache_path);

        let tracked = if cli.currencies.is_empty() {
            FAVORITE_CURRENCIES.iter().map(|c| c.to_string()).collect()
        } else {
            cli.currencies.iter().map(|c| c.to_uppercase()).collect()
        };

        Self {
            cache_path,
            max_age: Duration::from_secs(cli.max_age_hours * 3600),
            tracked,
        }
    }
}

/// XDG cache location for the cache file, falling back to the working
/// directory when no home directory exists (e.g. in CI).
fn default_cache_path() -> PathBuf {
    match ProjectDirs::from("", "", "fxrate") {
        Some(dirs) => dirs.cache_dir().join(DEFAULT_CACHE_FILE),
        None => PathBuf::from(DEFAULT_CACHE_FILE),
    }
}
