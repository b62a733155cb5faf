//! fxrate - interactive currency lookup and conversion
//!
//! Fetches exchange rate tables for a handful of tracked currencies from
//! open.er-api.com, caches them in a local JSON file, and serves lookups,
//! listings and conversions from that cache through a menu-driven shell.

mod cache;
mod cli;
mod convert;
mod data;
mod refresh;
mod shell;

use std::io;

use clap::Parser;

use cli::{Cli, Config};
use shell::Shell;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli);

    let mut shell = Shell::new(config);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    shell.run(&mut input).await?;

    Ok(())
}
