//! Cache refresh: fetch every tracked currency and persist the result
//!
//! Each tracked code is fetched with its own sequential request; a failure
//! for one code is recorded and skipped rather than aborting the batch. The
//! cache file is rewritten wholesale only when at least one table was
//! fetched, so a refresh that fails completely leaves the previous cache
//! untouched.

use thiserror::Error;

use crate::cache::{RateStore, StoreError};
use crate::data::{FetchError, RateCache, RatesClient};

/// Errors that fail a refresh as a whole
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Every tracked currency failed to fetch; nothing was written
    #[error("could not fetch rates for any tracked currency")]
    NothingFetched,

    /// The fetched cache could not be written to disk
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a refresh run: which codes made it into the new cache and
/// which were skipped, with the error that skipped them.
#[derive(Debug)]
pub struct RefreshReport {
    /// Codes whose tables are in the freshly written cache
    pub fetched: Vec<String>,
    /// Codes that failed, paired with the fetch error
    pub failed: Vec<(String, FetchError)>,
}

/// Fetches a fresh table for every code in `tracked` and overwrites the
/// cache file with the successful subset.
///
/// Requests are issued one after another; total latency is the sum of the
/// per-currency latencies. Partial failure is tolerated, but when no code
/// succeeds the previous cache file is left as it was and
/// [`RefreshError::NothingFetched`] is returned.
pub async fn refresh_all(
    client: &RatesClient,
    store: &RateStore,
    tracked: &[&str],
) -> Result<RefreshReport, RefreshError> {
    let mut cache = RateCache::new();
    let mut report = RefreshReport {
        fetched: Vec::new(),
        failed: Vec::new(),
    };

    for &code in tracked {
        match client.fetch_table(code).await {
            Ok(table) => {
                report.fetched.push(code.to_string());
                cache.insert(code.to_string(), table);
            }
            Err(e) => report.failed.push((code.to_string(), e)),
        }
    }

    if cache.is_empty() {
        return Err(RefreshError::NothingFetched);
    }

    store.save(&cache)?;
    Ok(report)
}
