//! Interactive menu shell
//!
//! A single blocking loop: print the menu, read a choice, dispatch, repeat
//! until the user exits. Every operation loads the cache first, refreshing it
//! when the file is missing, stale, or unreadable. Errors of any kind are
//! reported as console text and return control to the menu; nothing crashes
//! the loop.

use std::io::{self, BufRead, Write};

use crate::cache::{RateStore, StoreError};
use crate::cli::Config;
use crate::convert;
use crate::data::{RateCache, RatesClient};
use crate::refresh::{refresh_all, RefreshReport};

/// Where the shell loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    /// About to display the menu
    MenuPrompt,
    /// Menu displayed, waiting for a choice
    AwaitingCommand,
    /// User chose to exit; the loop stops
    Terminated,
}

/// One of the five menu operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    CurrencyInfo,
    ListCurrencies,
    Convert,
    Refresh,
}

/// Parses a menu line into a choice. Anything outside 0-4 is rejected.
pub fn parse_choice(line: &str) -> Option<MenuChoice> {
    match line.trim() {
        "0" => Some(MenuChoice::Exit),
        "1" => Some(MenuChoice::CurrencyInfo),
        "2" => Some(MenuChoice::ListCurrencies),
        "3" => Some(MenuChoice::Convert),
        "4" => Some(MenuChoice::Refresh),
        _ => None,
    }
}

/// Parses an amount entered for conversion.
pub fn parse_amount(line: &str) -> Result<f64, String> {
    let trimmed = line.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| format!("'{trimmed}' is not a valid number"))
}

/// Formats one conversion result line.
pub fn format_conversion(amount: f64, from: &str, result: f64, to: &str) -> String {
    format!("{amount} {from} = {result:.4} {to}")
}

/// The menu-driven shell over the cache, fetcher and conversion engine.
pub struct Shell {
    config: Config,
    store: RateStore,
    client: RatesClient,
    state: ShellState,
}

impl Shell {
    /// Creates a shell for the given configuration.
    pub fn new(config: Config) -> Self {
        let store = RateStore::new(config.cache_path.clone());
        Self {
            config,
            store,
            client: RatesClient::new(),
            state: ShellState::MenuPrompt,
        }
    }

    /// Current loop state, mainly for tests.
    pub fn state(&self) -> ShellState {
        self.state
    }

    /// Runs the menu loop until the user exits or input ends.
    pub async fn run(&mut self, input: &mut impl BufRead) -> io::Result<()> {
        while self.state != ShellState::Terminated {
            self.print_menu();
            self.state = ShellState::AwaitingCommand;

            let Some(line) = read_line(input)? else {
                // End of input behaves like choosing exit
                self.state = ShellState::Terminated;
                break;
            };

            match parse_choice(&line) {
                Some(MenuChoice::Exit) => {
                    println!("Goodbye.");
                    self.state = ShellState::Terminated;
                }
                Some(choice) => {
                    self.dispatch(choice, input).await?;
                    self.state = ShellState::MenuPrompt;
                }
                None => {
                    println!("Invalid choice. Please enter a number from 0 to 4.");
                    self.state = ShellState::MenuPrompt;
                }
            }
        }
        Ok(())
    }

    fn print_menu(&self) {
        println!();
        println!("{}", "=".repeat(50));
        println!("Currency rate cache");
        println!("{}", "=".repeat(50));
        println!("1 - Currency info");
        println!("2 - List currencies");
        println!("3 - Convert");
        println!("4 - Refresh rates");
        println!("0 - Exit");
        print!("Choose an action (0-4): ");
        let _ = io::stdout().flush();
    }

    async fn dispatch(&mut self, choice: MenuChoice, input: &mut impl BufRead) -> io::Result<()> {
        match choice {
            MenuChoice::CurrencyInfo => self.currency_info(input).await?,
            MenuChoice::ListCurrencies => self.list_currencies().await,
            MenuChoice::Convert => self.convert(input).await?,
            MenuChoice::Refresh => self.refresh().await,
            // Exit never reaches dispatch; the loop handles it directly
            MenuChoice::Exit => {}
        }
        Ok(())
    }

    /// Menu option 1: metadata and favorite quotes for one currency.
    async fn currency_info(&self, input: &mut impl BufRead) -> io::Result<()> {
        let Some(code) = prompt(input, "Enter a currency code (e.g. USD): ")? else {
            return Ok(());
        };
        let code = code.to_uppercase();
        if code.is_empty() {
            println!("Currency code must not be empty.");
            return Ok(());
        }

        let Some(cache) = self.load_cache().await else {
            return Ok(());
        };

        match convert::describe(&cache, &code) {
            Ok(info) => {
                println!("Information for currency {code}:");
                println!("{}", "-".repeat(50));
                println!("Code: {}", info.code);
                if let crate::data::CurrencyKind::Leaf { owner } = &info.kind {
                    println!("Quoted inside the {owner} rate table (no table of its own)");
                }
                println!("Base currency: {}", info.base_code);
                println!("Provider: {}", info.provider);
                println!("Last update: {}", info.time_last_update_utc);
                println!("Next update: {}", info.time_next_update_utc);

                println!();
                println!("Quotes of tracked currencies against {code}:");
                for favorite in &self.config.tracked {
                    match convert::resolve_rate(&cache, favorite, &code) {
                        Ok(rate) => println!("  1 {favorite} = {rate} {code}"),
                        Err(_) => println!("  1 {favorite} = ? {code} (no conversion path)"),
                    }
                }
            }
            Err(_) => self.report_unknown(&cache, &code),
        }
        Ok(())
    }

    /// Menu option 2: every code in the cache, sorted, with a total.
    async fn list_currencies(&self) {
        let Some(cache) = self.load_cache().await else {
            return;
        };
        let codes = convert::list_currencies(&cache);
        println!("Available currencies:");
        println!("{}", "-".repeat(50));
        for code in &codes {
            println!("{code}");
        }
        println!();
        println!("Total currencies: {}", codes.len());
    }

    /// Menu option 3: prompt for from/to/amount and convert.
    async fn convert(&self, input: &mut impl BufRead) -> io::Result<()> {
        let Some(from) = prompt(input, "Convert from (e.g. USD): ")? else {
            return Ok(());
        };
        let Some(to) = prompt(input, "Convert to (e.g. EUR): ")? else {
            return Ok(());
        };
        let Some(amount_line) = prompt(input, "Amount: ")? else {
            return Ok(());
        };

        let from = from.to_uppercase();
        let to = to.to_uppercase();
        if from.is_empty() || to.is_empty() || amount_line.is_empty() {
            println!("All fields must be filled in.");
            return Ok(());
        }

        let amount = match parse_amount(&amount_line) {
            Ok(amount) => amount,
            Err(message) => {
                println!("Error: {message}.");
                return Ok(());
            }
        };

        let Some(cache) = self.load_cache().await else {
            return Ok(());
        };

        match convert::convert(&cache, &from, &to, amount) {
            Ok(result) => println!("{}", format_conversion(amount, &from, result, &to)),
            Err(convert::ConvertError::Unknown(code)) => self.report_unknown(&cache, &code),
            Err(convert::ConvertError::Unreachable { from, to }) => {
                println!("Could not find a conversion path from {from} to {to}.");
            }
        }
        Ok(())
    }

    /// Menu option 4: force a refresh regardless of cache age.
    async fn refresh(&self) {
        println!("Refreshing currency rates...");
        match refresh_all(&self.client, &self.store, &self.tracked_refs()).await {
            Ok(report) => self.print_refresh_report(&report),
            Err(e) => {
                println!("Could not refresh rates: {e}.");
                println!("Please check your internet connection and try again.");
            }
        }
    }

    /// Loads a usable cache, refreshing first when the file is missing,
    /// stale, or corrupt. Returns None when no cache can be produced; the
    /// caller reports nothing further since the refresh already explained
    /// itself.
    async fn load_cache(&self) -> Option<RateCache> {
        if self.store.is_fresh(self.config.max_age) {
            match self.store.load() {
                Ok(cache) => return Some(cache),
                Err(StoreError::Parse(_)) => {
                    println!(
                        "Cache file {} contains invalid data. Refreshing...",
                        self.store.path().display()
                    );
                }
                Err(StoreError::NotFound(_)) => {
                    println!("Cache file not found. Refreshing...");
                }
                Err(e) => {
                    println!("Could not read the cache file: {e}. Refreshing...");
                }
            }
        } else {
            let hours = self.config.max_age.as_secs() / 3600;
            println!("Cache file is missing or older than {hours} hours. Refreshing...");
        }

        match refresh_all(&self.client, &self.store, &self.tracked_refs()).await {
            Ok(report) => {
                self.print_refresh_report(&report);
                self.store.load().ok()
            }
            Err(e) => {
                println!("Could not refresh rates: {e}.");
                println!("Please check your internet connection and try again.");
                None
            }
        }
    }

    fn print_refresh_report(&self, report: &RefreshReport) {
        for (code, error) in &report.failed {
            println!("Could not fetch rates for {code}: {error}");
        }
        println!(
            "Updated rates for {} saved to {}",
            report.fetched.join(", "),
            self.store.path().display()
        );
        if let Some(modified) = self.store.modified_at() {
            println!("Cache written at {}", modified.format("%Y-%m-%d %H:%M:%S"));
        }
    }

    fn report_unknown(&self, cache: &RateCache, code: &str) {
        let available: Vec<String> = convert::list_currencies(cache).into_iter().collect();
        println!("Currency {code} is not available.");
        println!("Available currencies: {}", available.join(", "));
    }

    fn tracked_refs(&self) -> Vec<&str> {
        self.config.tracked.iter().map(String::as_str).collect()
    }
}

/// Reads one line, trimmed. `None` means end of input.
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    let bytes = input.read_line(&mut line)?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Prints a prompt and reads the reply on the same line.
fn prompt(input: &mut impl BufRead, message: &str) -> io::Result<Option<String>> {
    print!("{message}");
    let _ = io::stdout().flush();
    read_line(input)
}
