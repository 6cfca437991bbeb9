//! Number formatting helpers shared by the table, chart and metrics output

use rust_decimal::{Decimal, RoundingStrategy};

/// Format with `,` thousands separators and `decimals` fraction digits,
/// rounding half away from zero.
///
/// # Examples
/// ```
/// use divcal::utils::format_amount;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount(dec!(1234567.891), 2), "1,234,567.89");
/// assert_eq!(format_amount(dec!(999.5), 0), "1,000");
/// ```
pub fn format_amount(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let is_negative = rounded < Decimal::ZERO;

    let formatted = format!("{:.*}", decimals as usize, rounded.abs());
    let (integer_part, fraction_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer_part.len() + integer_part.len() / 3);
    for (i, c) in integer_part.chars().enumerate() {
        if i > 0 && (integer_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if is_negative { "-" } else { "" };
    match fraction_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Whole-unit money with a currency prefix: `$12,345`
///
/// # Examples
/// ```
/// use divcal::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(66.67), "$"), "$67");
/// assert_eq!(format_currency(dec!(12345), "NT$"), "NT$12,345");
/// ```
pub fn format_currency(value: Decimal, symbol: &str) -> String {
    format!("{}{}", symbol, format_amount(value, 0))
}

/// Compact label for chart bars: `1.2k`, `35k`, `1.5M`
pub fn format_compact(value: Decimal) -> String {
    let thousand = Decimal::from(1_000);
    let million = Decimal::from(1_000_000);
    let abs = value.abs();

    let (scaled, suffix) = if abs >= million {
        (value / million, "M")
    } else if abs >= thousand {
        (value / thousand, "k")
    } else {
        (value, "")
    };

    let decimals = if scaled.abs() < Decimal::from(10) && !suffix.is_empty() {
        1
    } else {
        0
    };
    format!("{}{}", format_amount(scaled, decimals), suffix)
}
