//! Currency rate cache library
//!
//! This module exposes the cache, conversion and shell modules for use in
//! integration tests.

pub mod cache;
pub mod cli;
pub mod convert;
pub mod data;
pub mod refresh;
pub mod shell;
