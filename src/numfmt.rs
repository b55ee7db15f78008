//! Display formatting for money, quantities and percentages.
//!
//! Currency follows the Excel code `$#,##0.00`: fixed decimals, thousands
//! separators, symbol before the sign-stripped digits and a leading minus
//! for negatives (`-$1,234.50`). One locale is configured per editor; there
//! is no per-call locale variance.

use serde::{Deserialize, Serialize};

/// Currency display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub decimals: usize,
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl Default for CurrencyFormat {
    /// `en-US` dollars, as used by the grids and the PDF.
    fn default() -> Self {
        Self {
            symbol: "$".into(),
            decimals: 2,
            thousands_separator: ',',
            decimal_separator: '.',
        }
    }
}

impl CurrencyFormat {
    /// Format a monetary amount, e.g. `7016.75` → `$7,016.75`.
    pub fn format(&self, value: f64) -> String {
        let rounded = round_to(value, self.decimals);
        let digits = group_thousands(
            rounded.abs(),
            self.decimals,
            self.thousands_separator,
            self.decimal_separator,
        );
        // -0.00 prints without a sign
        if rounded < 0.0 {
            format!("-{}{digits}", self.symbol)
        } else {
            format!("{}{digits}", self.symbol)
        }
    }

    /// Format a plain number with the same separators and `decimals` places.
    pub fn format_number(&self, value: f64, decimals: usize) -> String {
        let rounded = round_to(value, decimals);
        let digits = group_thousands(
            rounded.abs(),
            decimals,
            self.thousands_separator,
            self.decimal_separator,
        );
        if rounded < 0.0 {
            format!("-{digits}")
        } else {
            digits
        }
    }

    /// Parse text typed or pasted into a grid cell under this format.
    ///
    /// The symbol, whitespace and thousands separators are dropped and the
    /// decimal separator is read as the decimal point, so `€1.234,50`
    /// parses as `1234.5` under a `€ . ,` format.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let trimmed = text.trim();
        let without_symbol = if self.symbol.is_empty() {
            trimmed.to_string()
        } else {
            trimmed.replace(self.symbol.as_str(), "")
        };
        let normalized: String = without_symbol
            .chars()
            .filter(|&c| c != self.thousands_separator && !c.is_whitespace())
            .map(|c| if c == self.decimal_separator { '.' } else { c })
            .collect();
        normalized.parse::<f64>().ok()
    }
}

/// Format with the default `$#,##0.00` currency format.
pub fn format_currency(value: f64) -> String {
    CurrencyFormat::default().format(value)
}

/// Round half away from zero to whole cents.
pub fn round_cents(value: f64) -> f64 {
    round_to(value, 2)
}

/// Format a quantity: integral values without decimals, others with up to
/// two (`19`, `2.5`, `0.25`).
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{value:.0}");
    }
    let text = format!("{:.2}", round_to(value, 2));
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Format a percentage with a fixed number of decimals (`12.5%`).
/// `None` prints as an em-dash placeholder used in the grids.
pub fn format_percent(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.prec$}%", round_to(v, decimals), prec = decimals),
        _ => "—".to_string(),
    }
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let exponent = i32::try_from(decimals.min(10)).unwrap_or(10);
    let factor = 10_f64.powi(exponent);
    (value * factor).round() / factor
}

/// Format a non-negative number with thousands separators.
fn group_thousands(value: f64, decimals: usize, thousands: char, decimal: char) -> String {
    let formatted = format!("{:.prec$}", value, prec = decimals.min(10));
    let mut parts = formatted.split('.');

    // split() always returns at least one element for a non-empty string
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next();

    let mut with_sep = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_sep.push(thousands);
        }
        with_sep.push(c);
    }
    let int_with_sep: String = with_sep.chars().rev().collect();

    match dec_part {
        Some(dec) => format!("{int_with_sep}{decimal}{dec}"),
        None => int_with_sep,
    }
}
