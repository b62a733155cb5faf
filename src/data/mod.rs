//! Core data models for the currency rate cache
//!
//! This module contains the types used throughout the application for
//! representing exchange rate tables as fetched from the upstream API and
//! stored in the local cache file.

pub mod fetcher;

pub use fetcher::{FetchError, RatesClient};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Currencies we fetch a full rate table for on every refresh.
///
/// Only these get an entry of their own in the cache; every other currency
/// appears solely as a key inside some tracked currency's `rates` map.
pub const FAVORITE_CURRENCIES: [&str; 4] = ["USD", "EUR", "GBP", "RUB"];

/// Exchange rate table for a single base currency, as returned by the
/// open.er-api.com `latest/{CODE}` endpoint.
///
/// `rates` maps a currency code to the amount of that currency one unit of
/// `base_code` buys. The API sometimes includes a self-entry
/// (`rates[base_code] == 1.0`) and sometimes omits it; [`RateTable::rate_for`]
/// normalizes this by always treating the self-rate as 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    /// Currency code this table is quoted against
    pub base_code: String,
    /// Name of the upstream rate provider
    #[serde(default)]
    pub provider: String,
    /// When the provider last updated these rates
    #[serde(default)]
    pub time_last_update_utc: String,
    /// When the provider expects to update these rates next
    #[serde(default)]
    pub time_next_update_utc: String,
    /// Quoted rates: one unit of `base_code` buys `rates[code]` units of `code`
    pub rates: BTreeMap<String, f64>,
}

impl RateTable {
    /// Returns the rate from this table's base currency to `code`.
    ///
    /// The base currency itself always resolves to 1.0, whether or not the
    /// upstream response included a self-entry in `rates`.
    pub fn rate_for(&self, code: &str) -> Option<f64> {
        if code == self.base_code {
            return Some(1.0);
        }
        self.rates.get(code).copied()
    }
}

/// The on-disk cache document: one [`RateTable`] per tracked base currency,
/// keyed by its code.
///
/// A `BTreeMap` keeps the pretty-printed JSON and all listings deterministic.
/// The cache is replaced wholesale on refresh; there is no incremental merge.
pub type RateCache = BTreeMap<String, RateTable>;

/// Whether a currency has its own rate table or is only quoted inside one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencyKind {
    /// The currency has its own [`RateTable`] in the cache
    Anchor,
    /// The currency only appears in the `rates` map of the named anchor
    Leaf {
        /// Code of the anchor whose table quotes this currency
        owner: String,
    },
}

/// Metadata about a single currency, resolved from the cache.
///
/// For an anchor this is its own table's metadata; for a leaf it is the
/// metadata of the owning anchor's table.
#[derive(Debug, Clone)]
pub struct CurrencyInfo {
    /// Upper-case currency code
    pub code: String,
    /// Anchor or leaf classification
    pub kind: CurrencyKind,
    /// Base code of the table the metadata was read from
    pub base_code: String,
    /// Upstream provider name
    pub provider: String,
    /// Last provider update timestamp, as reported upstream
    pub time_last_update_utc: String,
    /// Next provider update timestamp, as reported upstream
    pub time_next_update_utc: String,
}

impl CurrencyInfo {
    /// True when the currency has a rate table of its own.
    pub fn is_anchor(&self) -> bool {
        self.kind == CurrencyKind::Anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd_table() -> RateTable {
        RateTable {
            base_code: "USD".to_string(),
            provider: "https://www.exchangerate-api.com".to_string(),
            time_last_update_utc: "Fri, 29 Aug 2025 00:02:31 +0000".to_string(),
            time_next_update_utc: "Sat, 30 Aug 2025 00:02:31 +0000".to_string(),
            rates: BTreeMap::from([("EUR".to_string(), 0.9), ("RUB".to_string(), 90.0)]),
        }
    }

    #[test]
    fn test_rate_for_reads_stored_rate() {
        let table = usd_table();
        assert_eq!(table.rate_for("EUR"), Some(0.9));
        assert_eq!(table.rate_for("RUB"), Some(90.0));
    }

    #[test]
    fn test_rate_for_self_is_one_without_self_entry() {
        // The API omits the self-rate for some bases; it must still be 1.0
        let table = usd_table();
        assert!(!table.rates.contains_key("USD"));
        assert_eq!(table.rate_for("USD"), Some(1.0));
    }

    #[test]
    fn test_rate_for_unknown_code_is_none() {
        let table = usd_table();
        assert_eq!(table.rate_for("JPY"), None);
    }

    #[test]
    fn test_rate_table_deserializes_api_shape() {
        // Extra fields like result/documentation must be ignored
        let json = r#"{
            "result": "success",
            "documentation": "https://www.exchangerate-api.com/docs",
            "provider": "https://www.exchangerate-api.com",
            "base_code": "USD",
            "time_last_update_utc": "Fri, 29 Aug 2025 00:02:31 +0000",
            "time_next_update_utc": "Sat, 30 Aug 2025 00:02:31 +0000",
            "rates": {"USD": 1, "EUR": 0.9, "RUB": 90}
        }"#;

        let table: RateTable = serde_json::from_str(json).expect("Should parse API document");
        assert_eq!(table.base_code, "USD");
        assert_eq!(table.rates.len(), 3);
        assert_eq!(table.rate_for("EUR"), Some(0.9));
    }

    #[test]
    fn test_rate_table_deserializes_without_optional_metadata() {
        // Hand-trimmed or older cache files may lack provider/timestamps
        let json = r#"{"base_code": "EUR", "rates": {"USD": 1.11}}"#;

        let table: RateTable = serde_json::from_str(json).expect("Should parse minimal document");
        assert_eq!(table.base_code, "EUR");
        assert!(table.provider.is_empty());
        assert!(table.time_last_update_utc.is_empty());
    }

    #[test]
    fn test_rate_cache_serialization_roundtrip() {
        let mut cache = RateCache::new();
        cache.insert("USD".to_string(), usd_table());

        let json = serde_json::to_string_pretty(&cache).expect("Failed to serialize cache");
        let parsed: RateCache = serde_json::from_str(&json).expect("Failed to deserialize cache");

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["USD"].base_code, "USD");
        assert_eq!(parsed["USD"].rate_for("RUB"), Some(90.0));
    }

    #[test]
    fn test_currency_info_is_anchor() {
        let info = CurrencyInfo {
            code: "USD".to_string(),
            kind: CurrencyKind::Anchor,
            base_code: "USD".to_string(),
            provider: String::new(),
            time_last_update_utc: String::new(),
            time_next_update_utc: String::new(),
        };
        assert!(info.is_anchor());

        let leaf = CurrencyInfo {
            kind: CurrencyKind::Leaf {
                owner: "USD".to_string(),
            },
            code: "JPY".to_string(),
            ..info
        };
        assert!(!leaf.is_anchor());
    }
}
