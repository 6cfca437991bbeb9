use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod formatters;

#[derive(Parser)]
#[command(name = "divcal")]
#[command(version, about = "Monthly dividend income calendar for an equity portfolio")]
#[command(
    long_about = "Estimate how much dividend income a portfolio pays in each calendar month, based on the distributions of the trailing 12 months."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Config file (defaults to <config dir>/divcal/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Read dividends from a local CSV file (symbol,date,amount) instead of Yahoo Finance
    #[arg(long, global = true)]
    pub csv: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the calendar for the given holdings and exit
    Analyze {
        /// Holdings as SYMBOL=THOUSANDS (e.g. 2330=1.5 AAPL=0.05); a bare SYMBOL means 1 thousand
        #[arg(required = true)]
        holdings: Vec<String>,

        /// Export the symbol x month table to this CSV file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Launch the interactive session (default)
    Interactive,
}
