use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use divcal::cli::{Cli, Commands};
use divcal::commands::parse_holding;
use divcal::config::Config;
use divcal::dispatcher::Session;
use divcal::dividends::{CachedProvider, CsvProvider, DividendProvider, YahooProvider};
use divcal::ui;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so tables and JSON on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;
    let command = cli.command.unwrap_or(Commands::Interactive);

    match (command, cli.csv) {
        (Commands::Analyze { holdings, export }, Some(csv)) => {
            let session = Session::new(config, CsvProvider::new(csv), cli.json);
            run_analyze(session, &holdings, export.as_deref()).await
        }
        (Commands::Analyze { holdings, export }, None) => {
            let provider = YahooProvider::new(&config)?;
            let session = Session::new(config, provider, cli.json);
            run_analyze(session, &holdings, export.as_deref()).await
        }
        (Commands::Interactive, csv) => launch(config, csv, cli.json).await,
    }
}

/// One-shot analysis of holdings given on the command line
async fn run_analyze<P: DividendProvider>(
    mut session: Session<P>,
    holdings: &[String],
    export: Option<&Path>,
) -> Result<()> {
    for raw in holdings {
        let (symbol, thousands) = match parse_holding(raw) {
            Ok(h) => h,
            Err(e) => {
                eprintln!("{} {}", "⚠".yellow().bold(), e);
                continue;
            }
        };
        if let Err(e) = session.add(&symbol, thousands) {
            eprintln!("{} {}", "⚠".yellow().bold(), e);
        }
    }

    info!("Analyzing {} holdings", session.portfolio().len());
    let output = session.analyze_and_render(export).await?;
    print!("{}", output);
    Ok(())
}

async fn launch(config: Config, csv: Option<PathBuf>, json: bool) -> Result<()> {
    match csv {
        Some(path) => ui::launch_interactive(Session::new(config, CsvProvider::new(path), json)).await,
        None if config.cache_dividends => {
            let provider = CachedProvider::new(YahooProvider::new(&config)?);
            ui::launch_interactive(Session::new(config, provider, json)).await
        }
        None => {
            let provider = YahooProvider::new(&config)?;
            ui::launch_interactive(Session::new(config, provider, json)).await
        }
    }
}
