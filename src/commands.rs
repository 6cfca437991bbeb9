//! Interactive command parsing
//!
//! A small hand-written parser for REPL lines. Commands may be typed with
//! or without a leading slash (`add 2330 1` or `/add 2330 1`).

use std::str::FromStr;

use rust_decimal::Decimal;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a holding: `add <symbol> [thousands]`
    Add { symbol: String, thousands: Decimal },
    /// Remove by 1-based position: `remove <n>`
    Remove { position: usize },
    /// Remove every holding: `clear`
    Clear,
    /// Show holdings: `list`
    List,
    /// Build the dividend calendar: `analyze`
    Analyze,
    Help,
    Exit,
}

/// Error type for command parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParseError {
    pub message: String,
}

impl CommandParseError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a command line into a Command
pub fn parse_command(input: &str) -> Result<Command, CommandParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CommandParseError::new("Empty command"));
    }

    let mut parts = input.split_whitespace();
    let keyword = parts
        .next()
        .map(|k| k.trim_start_matches('/').to_lowercase())
        .unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match keyword.as_str() {
        "add" | "a" => parse_add(&args),
        "remove" | "rm" | "del" => {
            let raw = args
                .first()
                .ok_or_else(|| CommandParseError::new("Usage: remove <n>"))?;
            let position = raw
                .parse::<usize>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or_else(|| {
                    CommandParseError::new(format!("Invalid position '{}': use 1, 2, ...", raw))
                })?;
            Ok(Command::Remove { position })
        }
        "clear" => Ok(Command::Clear),
        "list" | "ls" => Ok(Command::List),
        "analyze" | "analyse" | "run" => Ok(Command::Analyze),
        "help" | "h" | "?" => Ok(Command::Help),
        "exit" | "quit" | "q" => Ok(Command::Exit),
        other => Err(CommandParseError::new(format!(
            "Unknown command '{}'. Type help for the list of commands",
            other
        ))),
    }
}

fn parse_add(args: &[&str]) -> Result<Command, CommandParseError> {
    let symbol = args
        .first()
        .ok_or_else(|| CommandParseError::new("Usage: add <symbol> [thousands]"))?;

    let thousands = match args.get(1) {
        Some(raw) => parse_thousands(raw)?,
        None => Decimal::ONE,
    };

    if args.len() > 2 {
        return Err(CommandParseError::new("Usage: add <symbol> [thousands]"));
    }

    Ok(Command::Add {
        symbol: symbol.to_string(),
        thousands,
    })
}

/// Parse a share quantity in thousands (`1`, `0.5`).
///
/// Commas are rejected: amounts are printed with `,` as the thousands
/// separator, so `1,500` would be ambiguous.
pub fn parse_thousands(raw: &str) -> Result<Decimal, CommandParseError> {
    if raw.contains(',') {
        return Err(CommandParseError::new(format!(
            "Invalid share amount '{}': use a dot for fractions (1.5 = 1,500 shares)",
            raw
        )));
    }
    Decimal::from_str(raw)
        .map_err(|_| CommandParseError::new(format!("Invalid share amount '{}'", raw)))
}

/// Parse a one-shot holding argument `SYMBOL=THOUSANDS`
pub fn parse_holding(raw: &str) -> Result<(String, Decimal), CommandParseError> {
    match raw.split_once('=') {
        Some((symbol, amount)) if !symbol.trim().is_empty() => {
            Ok((symbol.trim().to_string(), parse_thousands(amount.trim())?))
        }
        Some(_) => Err(CommandParseError::new(format!(
            "Invalid holding '{}': expected SYMBOL=THOUSANDS",
            raw
        ))),
        None => Ok((raw.trim().to_string(), Decimal::ONE)),
    }
}
