//! Cache module for persisting rate tables to disk
//!
//! This module provides a store that reads and writes the whole rate cache as
//! a single pretty-printed JSON file and answers freshness queries from the
//! file's modification timestamp.

mod store;

pub use store::{RateStore, StoreError};
