//! Session state and command dispatch
//!
//! A [`Session`] owns the portfolio for one interactive run together with
//! the dividend provider. Commands from the REPL and the one-shot CLI both
//! go through [`Session::dispatch`], which returns the text to show instead
//! of printing it.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calendar::{self, CalendarReport};
use crate::cli::formatters;
use crate::commands::Command;
use crate::config::Config;
use crate::dividends::DividendProvider;
use crate::error::PortfolioError;
use crate::portfolio::{PortfolioEntry, PortfolioStore};
use crate::symbols::normalize_symbol;
use crate::ui::progress::ProgressPrinter;

/// What the caller should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Exit,
}

pub struct Session<P> {
    config: Config,
    store: PortfolioStore,
    provider: P,
    json_output: bool,
}

impl<P: DividendProvider> Session<P> {
    pub fn new(config: Config, provider: P, json_output: bool) -> Self {
        Self {
            config,
            store: PortfolioStore::new(),
            provider,
            json_output,
        }
    }

    pub fn portfolio(&self) -> &PortfolioStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Normalize the symbol and add a holding given in thousands of shares
    pub fn add(&mut self, raw_symbol: &str, thousands: Decimal) -> Result<PortfolioEntry, PortfolioError> {
        let symbol = normalize_symbol(raw_symbol, &self.config.exchange_suffix)?;
        let entry = self
            .store
            .add_thousands(&symbol, thousands, self.config.share_unit)?
            .clone();
        info!("Added {} ({} shares)", entry.symbol, entry.shares);
        Ok(entry)
    }

    /// Run one analysis over the current portfolio
    pub async fn analyze(&self) -> CalendarReport {
        let printer = ProgressPrinter::new(self.store.len(), self.json_output);
        let report = calendar::aggregate(&self.store, &self.provider, Utc::now(), |ev| {
            printer.on_event(ev)
        })
        .await;
        printer.finish();
        report
    }

    /// Render a report the way the session is configured to
    pub fn render_report(&self, report: &CalendarReport) -> String {
        if self.json_output {
            return format!("{}\n", formatters::format_report_json(report));
        }

        let mut output = formatters::format_notices(&report.notices);
        if report.has_data() {
            output.push_str(&formatters::format_report(report, &self.config.currency_symbol));
        } else {
            warn!("No dividend records produced for {} holdings", self.store.len());
            output.push_str(&formatters::format_no_data());
        }
        output
    }

    /// Analyze, optionally export the matrix, and render
    pub async fn analyze_and_render(&self, export: Option<&Path>) -> Result<String> {
        if self.store.is_empty() {
            return Ok(formatters::format_empty_portfolio());
        }

        let report = self.analyze().await;
        let mut output = self.render_report(&report);

        if let Some(path) = export {
            match &report.matrix {
                Some(matrix) => {
                    formatters::write_matrix_csv(matrix, path)?;
                    if !self.json_output {
                        output.push_str(&format!(
                            "{} Exported calendar to {}\n",
                            "✓".green().bold(),
                            path.display()
                        ));
                    }
                }
                None => warn!("Nothing to export to {}", path.display()),
            }
        }

        Ok(output)
    }

    /// Route a parsed command to its handler
    pub async fn dispatch(&mut self, command: Command) -> Result<Flow> {
        let output = match command {
            Command::Add { symbol, thousands } => match self.add(&symbol, thousands) {
                Ok(entry) => format!(
                    "{} Added {} ({} shares)\n",
                    "✓".green().bold(),
                    entry.symbol,
                    crate::utils::format_amount(entry.shares, 0)
                ),
                Err(e) => format!("{} {}\n", "⚠".yellow().bold(), e),
            },
            Command::Remove { position } => match self.store.remove(position.saturating_sub(1)) {
                Ok(removed) => format!(
                    "{} Removed {}\n{}",
                    "✓".green().bold(),
                    removed.symbol,
                    formatters::format_portfolio_list(&self.store, self.config.share_unit)
                ),
                Err(PortfolioError::IndexOutOfRange { len, .. }) => format!(
                    "{} No holding #{} (portfolio has {})\n",
                    "⚠".yellow().bold(),
                    position,
                    len
                ),
                Err(e) => format!("{} {}\n", "⚠".yellow().bold(), e),
            },
            Command::Clear => {
                self.store.clear();
                format!("{} Portfolio cleared\n", "✓".green().bold())
            }
            Command::List => formatters::format_portfolio_list(&self.store, self.config.share_unit),
            Command::Analyze => self.analyze_and_render(None).await?,
            Command::Help => help_text(),
            Command::Exit => return Ok(Flow::Exit),
        };
        Ok(Flow::Continue(output))
    }
}

pub fn help_text() -> String {
    [
        "Commands:",
        "  add <symbol> [thousands]   - Add a holding (default 1 = 1,000 shares)",
        "  remove <n>                 - Remove holding number n (see list)",
        "  clear                      - Remove every holding",
        "  list                       - Show holdings",
        "  analyze                    - Build the trailing 12-month dividend calendar",
        "  help                       - Show this help",
        "  exit                       - Exit",
        "",
        "Numeric codes get the local exchange suffix: 2330 -> 2330.TW",
        "Share amounts are in thousands with a dot for fractions: add 2330 1.5 = 1,500 shares",
        "",
    ]
    .join("\n")
}
