//! FILENAME: core/metrics/src/number_format.rs
//! PURPOSE: Unit-aware formatting and lenient parsing of metric strings.
//! CONTEXT: Metric values travel as display strings ("12.4 M€", "31.5%").
//! Adjustments and sorting parse them back, rescale them, and re-emit them in
//! the same unit and precision.

use serde::{Deserialize, Serialize};

// ============================================================================
// UNITS
// ============================================================================

/// Unit carried by a formatted metric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricUnit {
    Euro,
    KiloEuro,
    MegaEuro,
    Percent,
    /// No recognizable suffix.
    Plain,
}

impl MetricUnit {
    pub fn suffix(&self) -> &'static str {
        match self {
            MetricUnit::Euro => "€",
            MetricUnit::KiloEuro => "k€",
            MetricUnit::MegaEuro => "M€",
            MetricUnit::Percent => "%",
            MetricUnit::Plain => "",
        }
    }

    /// How many euros one unit represents. Non-currency units have a scale of 1.
    pub fn scale(&self) -> f64 {
        match self {
            MetricUnit::KiloEuro => 1_000.0,
            MetricUnit::MegaEuro => 1_000_000.0,
            _ => 1.0,
        }
    }

    pub fn is_currency(&self) -> bool {
        matches!(self, MetricUnit::Euro | MetricUnit::KiloEuro | MetricUnit::MegaEuro)
    }

    /// Splits a formatted string into its unit and the remaining numeric text.
    fn detect(text: &str) -> (MetricUnit, &str) {
        let trimmed = text.trim();
        if let Some(rest) = trimmed.strip_suffix("M€") {
            (MetricUnit::MegaEuro, rest)
        } else if let Some(rest) = trimmed
            .strip_suffix("k€")
            .or_else(|| trimmed.strip_suffix("K€"))
        {
            (MetricUnit::KiloEuro, rest)
        } else if let Some(rest) = trimmed.strip_suffix('€') {
            (MetricUnit::Euro, rest)
        } else if let Some(rest) = trimmed.strip_suffix('%') {
            (MetricUnit::Percent, rest)
        } else {
            (MetricUnit::Plain, trimmed)
        }
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Result of leniently parsing a formatted metric string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedMetric {
    /// Numeric value expressed in `unit` (not converted to euros).
    pub value: f64,
    pub unit: MetricUnit,
    /// Number of decimals found in the source text.
    pub decimals: usize,
    /// False when the numeric part could not be read and `value` fell back to 0.
    pub parsed: bool,
}

/// Parses a formatted metric string such as "12.4 M€", "-0.8%" or "3,5 k€".
///
/// Never fails: text that does not contain a readable number yields a value
/// of 0 with `parsed == false`.
pub fn parse_metric(text: &str) -> ParsedMetric {
    let (unit, numeric) = MetricUnit::detect(text);

    let cleaned: String = numeric
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}' && *c != '+')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let decimals = cleaned
        .find('.')
        .map(|pos| cleaned[pos + 1..].chars().take_while(|c| c.is_ascii_digit()).count())
        .unwrap_or(0);

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => ParsedMetric {
            value,
            unit,
            decimals,
            parsed: true,
        },
        _ => ParsedMetric {
            value: 0.0,
            unit,
            decimals,
            parsed: false,
        },
    }
}

/// Numeric value of a formatted string in its own unit, 0 when unreadable.
pub fn parse_number(text: &str) -> f64 {
    parse_metric(text).value
}

/// Value of a formatted currency string converted to euros, 0 when unreadable.
pub fn parse_amount(text: &str) -> f64 {
    let parsed = parse_metric(text);
    parsed.value * parsed.unit.scale()
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Formats an amount in euros, choosing M€ / k€ / € by magnitude.
pub fn format_amount(euros: f64) -> String {
    let euros = finite_or_zero(euros);
    let abs = euros.abs();
    if abs >= 1_000_000.0 {
        format_in_unit(euros / 1_000_000.0, MetricUnit::MegaEuro, 1)
    } else if abs >= 1_000.0 {
        format_in_unit(euros / 1_000.0, MetricUnit::KiloEuro, 1)
    } else {
        format_in_unit(euros, MetricUnit::Euro, 0)
    }
}

/// Formats a unit price in euros with cents.
pub fn format_price(euros: f64) -> String {
    format_in_unit(finite_or_zero(euros), MetricUnit::Euro, 2)
}

/// Formats a percentage (already multiplied by 100) with one decimal.
pub fn format_percent(pct: f64) -> String {
    format_in_unit(finite_or_zero(pct), MetricUnit::Percent, 1)
}

/// Formats a signed evolution percentage: "+1.8%", "-0.6%", "0.0%".
pub fn format_evolution(pct: f64) -> String {
    let pct = finite_or_zero(pct);
    let rounded = (pct * 10.0).round() / 10.0;
    if rounded == 0.0 {
        "0.0%".to_string()
    } else {
        format!("{:+.1}%", rounded)
    }
}

/// Formats a value already expressed in `unit` with a fixed precision.
pub fn format_in_unit(value: f64, unit: MetricUnit, decimals: usize) -> String {
    let value = finite_or_zero(value);
    // Avoid "-0.0" after rounding.
    let factor = 10f64.powi(decimals as i32);
    let value = if (value * factor).round() == 0.0 { 0.0 } else { value };

    match unit {
        MetricUnit::Percent => format!("{:.prec$}%", value, prec = decimals),
        MetricUnit::Plain => format!("{:.prec$}", value, prec = decimals),
        _ => format!("{:.prec$} {}", value, unit.suffix(), prec = decimals),
    }
}

/// Multiplies a formatted value by `factor`, keeping its unit and precision.
pub fn rescale(text: &str, factor: f64) -> String {
    let parsed = parse_metric(text);
    format_in_unit(parsed.value * factor, parsed.unit, parsed.decimals)
}

/// Converts a value between currency units. Non-currency units pass through.
pub fn convert(value: f64, from: MetricUnit, to: MetricUnit) -> f64 {
    if from.is_currency() && to.is_currency() {
        value * from.scale() / to.scale()
    } else {
        value
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
