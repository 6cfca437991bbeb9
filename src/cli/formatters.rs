//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of aggregation from presentation.

use std::path::Path;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::calendar::{AnalysisNotice, CalendarReport, MatrixRow, PayoutMatrix};
use crate::portfolio::PortfolioStore;
use crate::utils::{format_amount, format_compact, format_currency};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const BAR_WIDTH: usize = 40;

/// Sequential green scale, lightest to darkest
const SCALE_LOW: (u8, u8, u8) = (247, 252, 245);
const SCALE_HIGH: (u8, u8, u8) = (0, 109, 44);

/// Position of `value` on the scale, 0.0 to 1.0
fn scale_ratio(value: Decimal, max: Decimal) -> f64 {
    if max <= Decimal::ZERO || value <= Decimal::ZERO {
        return 0.0;
    }
    (value / max).to_f64().unwrap_or(0.0).clamp(0.0, 1.0)
}

fn scale_color(ratio: f64) -> (u8, u8, u8) {
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * ratio).round() as u8;
    (
        lerp(SCALE_LOW.0, SCALE_HIGH.0),
        lerp(SCALE_LOW.1, SCALE_HIGH.1),
        lerp(SCALE_LOW.2, SCALE_HIGH.2),
    )
}

/// Heatmap cell: background from the scale, text flipped to white on dark cells
fn heat_cell(text: String, value: Decimal, max: Decimal) -> String {
    let ratio = scale_ratio(value, max);
    let (r, g, b) = scale_color(ratio);
    let cell: ColoredString = if ratio > 0.5 {
        text.white().on_truecolor(r, g, b)
    } else {
        text.black().on_truecolor(r, g, b)
    };
    cell.to_string()
}

/// Two headline numbers: annual total and monthly average
pub fn format_metrics(report: &CalendarReport, currency: &str) -> String {
    format!(
        "{:<28} {}\n{:<28} {}\n",
        "💰 Estimated annual dividends:".bold(),
        format_currency(report.annual_total, currency).green().bold(),
        "📅 Average monthly income:".bold(),
        format_currency(report.average_monthly, currency).green().bold(),
    )
}

/// Horizontal bar chart of income per month, January to December
pub fn format_bar_chart(report: &CalendarReport) -> String {
    let totals = report.monthly_totals();
    let max = totals.iter().copied().max().unwrap_or(Decimal::ZERO);

    let mut output = format!("{}\n", "📊 Monthly dividend income".cyan().bold());
    for (name, value) in MONTH_NAMES.iter().zip(totals.iter()) {
        let ratio = scale_ratio(*value, max);
        let len = (ratio * BAR_WIDTH as f64).round() as usize;
        let len = if *value > Decimal::ZERO { len.max(1) } else { 0 };

        let (r, g, b) = scale_color(0.3 + 0.7 * ratio);
        let bar = "█".repeat(len).truecolor(r, g, b);
        output.push_str(&format!(
            "{:>3} │{}{} {}\n",
            name,
            bar,
            " ".repeat(BAR_WIDTH - len),
            format_compact(*value)
        ));
    }
    output
}

#[derive(Tabled)]
struct HeatmapRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "1")]
    jan: String,
    #[tabled(rename = "2")]
    feb: String,
    #[tabled(rename = "3")]
    mar: String,
    #[tabled(rename = "4")]
    apr: String,
    #[tabled(rename = "5")]
    may: String,
    #[tabled(rename = "6")]
    jun: String,
    #[tabled(rename = "7")]
    jul: String,
    #[tabled(rename = "8")]
    aug: String,
    #[tabled(rename = "9")]
    sep: String,
    #[tabled(rename = "10")]
    oct: String,
    #[tabled(rename = "11")]
    nov: String,
    #[tabled(rename = "12")]
    dec: String,
    #[tabled(rename = "Total")]
    total: String,
}

impl HeatmapRow {
    fn from_cells(symbol: String, cells: Vec<String>, total: String) -> Self {
        let mut it = cells.into_iter();
        let mut next = || it.next().unwrap_or_default();
        Self {
            symbol,
            jan: next(),
            feb: next(),
            mar: next(),
            apr: next(),
            may: next(),
            jun: next(),
            jul: next(),
            aug: next(),
            sep: next(),
            oct: next(),
            nov: next(),
            dec: next(),
            total,
        }
    }
}

fn symbol_row(row: &MatrixRow, max: Decimal) -> HeatmapRow {
    let cells = row
        .months
        .iter()
        .map(|v| heat_cell(format_amount(*v, 0), *v, max))
        .collect();
    HeatmapRow::from_cells(
        row.symbol.clone(),
        cells,
        format_amount(row.total, 0).bold().to_string(),
    )
}

fn totals_row(row: &MatrixRow) -> HeatmapRow {
    let cells = row
        .months
        .iter()
        .map(|v| format_amount(*v, 0).bold().to_string())
        .collect();
    HeatmapRow::from_cells(
        row.symbol.bold().to_string(),
        cells,
        format_amount(row.total, 0).bold().green().to_string(),
    )
}

/// Symbol x month table with a heatmap over the monthly cells and a bold totals row
pub fn format_heatmap_table(matrix: &PayoutMatrix) -> String {
    let max = matrix.max_cell();
    let mut rows: Vec<HeatmapRow> = matrix.rows.iter().map(|r| symbol_row(r, max)).collect();
    rows.push(totals_row(&matrix.totals));

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    // Right-align everything except Symbol
    table.modify(Columns::new(1..), Alignment::right());

    format!(
        "{}\n{}\n",
        "📋 Dividends per symbol and month".cyan().bold(),
        table
    )
}

/// Full terminal rendering of a successful analysis
pub fn format_report(report: &CalendarReport, currency: &str) -> String {
    let Some(matrix) = &report.matrix else {
        return format_no_data();
    };

    let mut output = String::new();
    output.push_str(&format!(
        "\n{} Trailing 12 months: {} → {}\n\n",
        "📅".cyan().bold(),
        report.window.start.format("%Y-%m-%d"),
        report.window.end.format("%Y-%m-%d")
    ));
    output.push_str(&format_metrics(report, currency));
    output.push_str(&format!("\n{}\n\n", "━".repeat(60).bright_black()));
    output.push_str(&format_bar_chart(report));
    output.push('\n');
    output.push_str(&format_heatmap_table(matrix));
    output.push_str(&format!(
        "\n{}\n",
        "Amounts are estimates based on past distributions; actual dates and amounts follow each issuer's announcements."
            .bright_black()
    ));
    output
}

/// Per-symbol warnings and notices from one analysis run
pub fn format_notices(notices: &[AnalysisNotice]) -> String {
    notices
        .iter()
        .map(|n| {
            if n.is_error() {
                format!("{} {}\n", "✗".red().bold(), n.message())
            } else {
                format!("{} {}\n", "ℹ".blue().bold(), n.message())
            }
        })
        .collect()
}

/// Numbered holdings list, 1-based to match `remove <n>`
pub fn format_portfolio_list(store: &PortfolioStore, share_unit: u32) -> String {
    if store.is_empty() {
        return format_empty_portfolio();
    }

    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "#")]
        position: usize,
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Shares")]
        shares: String,
        #[tabled(rename = "Thousands")]
        thousands: String,
    }

    let unit = Decimal::from(share_unit);
    let rows: Vec<EntryRow> = store
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| EntryRow {
            position: i + 1,
            symbol: e.symbol.clone(),
            shares: format_amount(e.shares, 0),
            thousands: (e.shares / unit).normalize().to_string(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(2..), Alignment::right());

    format!(
        "{} Tracking {} holdings\n{}\n",
        "📌".cyan().bold(),
        store.len(),
        table
    )
}

pub fn format_empty_portfolio() -> String {
    format!(
        "{} Portfolio is empty\nAdd holdings first using: {} <symbol> [thousands]\n",
        "ℹ".blue().bold(),
        "add".bold()
    )
}

pub fn format_no_data() -> String {
    format!(
        "{} No dividend records for this portfolio in the last 12 months\n",
        "⚠".yellow().bold()
    )
}

/// Machine-readable rendering of the whole report
pub fn format_report_json(report: &CalendarReport) -> String {
    #[derive(Serialize)]
    struct JsonReport<'a> {
        window_start: String,
        window_end: String,
        has_data: bool,
        annual_total: Decimal,
        average_monthly: Decimal,
        monthly_totals: [Decimal; 12],
        matrix: &'a Option<PayoutMatrix>,
        records: &'a [crate::calendar::PayoutRecord],
        notices: &'a [AnalysisNotice],
    }

    let payload = JsonReport {
        window_start: report.window.start.to_rfc3339(),
        window_end: report.window.end.to_rfc3339(),
        has_data: report.has_data(),
        annual_total: report.annual_total,
        average_monthly: report.average_monthly.round_dp(2),
        monthly_totals: report.monthly_totals(),
        matrix: &report.matrix,
        records: &report.records,
        notices: &report.notices,
    };

    serde_json::to_string_pretty(&payload)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Write the matrix, totals row included, as CSV
pub fn write_matrix_csv(matrix: &PayoutMatrix, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut header = vec!["Symbol".to_string()];
    header.extend((1..=12).map(|m| m.to_string()));
    header.push("Total".to_string());
    writer.write_record(&header)?;

    for row in matrix.rows.iter().chain(std::iter::once(&matrix.totals)) {
        let mut record = vec![row.symbol.clone()];
        record.extend(row.months.iter().map(|v| v.to_string()));
        record.push(row.total.to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
