//! Currency conversion engine
//!
//! Pure functions over a [`RateCache`], independently testable without any
//! I/O. The cache holds one rate table per tracked (anchor) currency; every
//! other currency is a leaf that only exists inside some anchor's `rates`
//! map. Conversions between arbitrary codes therefore reduce to an
//! anchor-to-anchor resolution, with leaf rates applied as corrective factors
//! on either end, and a bridge currency used when two anchors share neither a
//! direct quote nor a base.

use std::collections::BTreeSet;
use thiserror::Error;

use crate::data::{CurrencyInfo, CurrencyKind, RateCache, RateTable};

/// Errors produced while resolving a rate from the cache
#[derive(Debug, Error, PartialEq)]
pub enum ConvertError {
    /// The code appears nowhere in the cache, neither as anchor nor as leaf
    #[error("currency {0} is not available in the cached rates")]
    Unknown(String),

    /// Both codes exist but no direct, shared-base, or bridged path connects
    /// them (or a rate along the only path is zero)
    #[error("no conversion path from {from} to {to}")]
    Unreachable {
        /// Source currency code
        from: String,
        /// Target currency code
        to: String,
    },
}

/// Resolves the exchange rate from `from` to `to` using the cached tables.
///
/// Resolution order mirrors the shape of the cache:
/// 1. identity: `rate(X, X) == 1.0` for any known code, leaf or anchor;
/// 2. anchor to anchor: direct quote, then shared reported base, then a
///    bridge currency quoted by both tables (USD preferred);
/// 3. a leaf on either end is first reduced to its owning anchor, with the
///    leaf's stored rate applied as a final multiply or divide.
///
/// Missing keys and zero divisors yield [`ConvertError::Unreachable`], never
/// a panic.
pub fn resolve_rate(cache: &RateCache, from: &str, to: &str) -> Result<f64, ConvertError> {
    if !is_known(cache, from) {
        return Err(ConvertError::Unknown(from.to_string()));
    }
    if !is_known(cache, to) {
        return Err(ConvertError::Unknown(to.to_string()));
    }
    if from == to {
        return Ok(1.0);
    }

    let unreachable = || ConvertError::Unreachable {
        from: from.to_string(),
        to: to.to_string(),
    };

    match (cache.get(from), cache.get(to)) {
        (Some(_), Some(_)) => resolve_anchors(cache, from, to).ok_or_else(unreachable),
        (Some(_), None) => {
            // Anchor -> leaf: route to the leaf's owner, then apply the
            // stored owner->leaf rate. Preferring `from` as owner makes the
            // direct-quote case a plain table lookup.
            let (owner, leaf_rate) = find_owner(cache, to, &[from, "USD"]).ok_or_else(unreachable)?;
            let to_owner = resolve_anchors(cache, from, &owner).ok_or_else(unreachable)?;
            Ok(to_owner * leaf_rate)
        }
        (None, Some(_)) => {
            let (owner, leaf_rate) = find_owner(cache, from, &[to, "USD"]).ok_or_else(unreachable)?;
            let from_owner = resolve_anchors(cache, &owner, to).ok_or_else(unreachable)?;
            checked_div(from_owner, leaf_rate).ok_or_else(unreachable)
        }
        (None, None) => {
            // Leaf -> leaf: lift both ends to their owning anchors. Trying
            // the source's owner first for the target keeps same-owner pairs
            // on a single table.
            let (from_owner, from_rate) =
                find_owner(cache, from, &["USD"]).ok_or_else(unreachable)?;
            let (to_owner, to_rate) =
                find_owner(cache, to, &[from_owner.as_str(), "USD"]).ok_or_else(unreachable)?;
            let between = resolve_anchors(cache, &from_owner, &to_owner).ok_or_else(unreachable)?;
            checked_div(between * to_rate, from_rate).ok_or_else(unreachable)
        }
    }
}

/// Converts `amount` from one currency to another: `amount * resolve_rate`.
pub fn convert(cache: &RateCache, from: &str, to: &str, amount: f64) -> Result<f64, ConvertError> {
    Ok(amount * resolve_rate(cache, from, to)?)
}

/// All currency codes reachable through the cache, sorted: the anchors plus
/// every code quoted inside any anchor's rates map.
pub fn list_currencies(cache: &RateCache) -> BTreeSet<String> {
    let mut codes = BTreeSet::new();
    for (anchor, table) in cache {
        codes.insert(anchor.clone());
        codes.extend(table.rates.keys().cloned());
    }
    codes
}

/// Looks up metadata for a currency code.
///
/// Anchors report their own table's metadata. Leaves report the metadata of
/// the anchor that quotes them, with [`CurrencyKind::Leaf`] naming that
/// owner.
pub fn describe(cache: &RateCache, code: &str) -> Result<CurrencyInfo, ConvertError> {
    if let Some(table) = cache.get(code) {
        return Ok(info_from(code, CurrencyKind::Anchor, table));
    }
    let (owner, _) = find_owner(cache, code, &["USD"])
        .ok_or_else(|| ConvertError::Unknown(code.to_string()))?;
    let table = &cache[&owner];
    Ok(info_from(code, CurrencyKind::Leaf { owner }, table))
}

fn info_from(code: &str, kind: CurrencyKind, table: &RateTable) -> CurrencyInfo {
    CurrencyInfo {
        code: code.to_string(),
        kind,
        base_code: table.base_code.clone(),
        provider: table.provider.clone(),
        time_last_update_utc: table.time_last_update_utc.clone(),
        time_next_update_utc: table.time_next_update_utc.clone(),
    }
}

/// True when the code is an anchor or appears in any anchor's rates map.
fn is_known(cache: &RateCache, code: &str) -> bool {
    cache.contains_key(code) || cache.values().any(|t| t.rates.contains_key(code))
}

/// Resolves a rate between two anchors, or `None` when no path exists.
fn resolve_anchors(cache: &RateCache, from: &str, to: &str) -> Option<f64> {
    if from == to {
        return Some(1.0);
    }
    let from_table = cache.get(from)?;
    let to_table = cache.get(to)?;

    // Direct quote stored in the source table. Only a real entry counts:
    // self-rate normalization would answer 1.0 for the table's own base
    // code, which is wrong when an anchor key and its base_code differ.
    if let Some(rate) = from_table.rates.get(to) {
        return Some(*rate);
    }

    // Shared reported base B: rate(from, to) = rate(B, to) / rate(B, from),
    // each read from the table that carries it
    if from_table.base_code == to_table.base_code {
        let base_to = to_table.rate_for(to)?;
        let base_from = from_table.rate_for(from)?;
        return checked_div(base_to, base_from);
    }

    // Bridge through a currency both tables quote, preferring USD
    let bridge = pick_bridge(from_table, to_table)?;
    let from_bridge = from_table.rate_for(&bridge)?;
    let to_bridge = to_table.rate_for(&bridge)?;
    checked_div(from_bridge, to_bridge)
}

/// Picks a currency quoted by both tables to bridge through. USD wins when
/// both sides can price it; otherwise the first shared code in sorted order.
fn pick_bridge(from_table: &RateTable, to_table: &RateTable) -> Option<String> {
    if from_table.rate_for("USD").is_some() && to_table.rate_for("USD").is_some() {
        return Some("USD".to_string());
    }
    from_table
        .rates
        .keys()
        .find(|code| to_table.rate_for(code).is_some())
        .cloned()
}

/// Locates the anchor whose rates map quotes `code`, checking `preferred`
/// anchors first and the remaining anchors in sorted order.
///
/// Returns the owner's code together with the stored owner-to-leaf rate.
fn find_owner(cache: &RateCache, code: &str, preferred: &[&str]) -> Option<(String, f64)> {
    for &candidate in preferred {
        if let Some(table) = cache.get(candidate) {
            if let Some(rate) = table.rates.get(code) {
                return Some((candidate.to_string(), *rate));
            }
        }
    }
    cache
        .iter()
        .find_map(|(anchor, table)| table.rates.get(code).map(|rate| (anchor.clone(), *rate)))
}

fn checked_div(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}
