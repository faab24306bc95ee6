//! FILENAME: core/metrics/src/metric.rs
//! PURPOSE: The formatted metric value shared by every perimeter row.

use serde::{Deserialize, Serialize};

use crate::number_format::{
    format_amount, format_evolution, format_in_unit, format_percent, format_price, parse_metric,
    rescale, MetricUnit,
};

/// A displayed value and its signed evolution, both already formatted.
///
/// The two strings are always produced together from one seed, so a given
/// seed yields the same evolution for the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Metric {
    /// Formatted value with unit, e.g. "12.4 M€" or "31.5%".
    pub value: String,
    /// Signed percentage, e.g. "+1.8%".
    pub evolution: String,
}

impl Metric {
    pub fn new(value: impl Into<String>, evolution: impl Into<String>) -> Self {
        Metric {
            value: value.into(),
            evolution: evolution.into(),
        }
    }

    /// An amount in euros, formatted in M€ / k€ / € by magnitude.
    pub fn amount(euros: f64, evolution_pct: f64) -> Self {
        Metric::new(format_amount(euros), format_evolution(evolution_pct))
    }

    /// A percentage of revenue.
    pub fn percent(pct: f64, evolution_pct: f64) -> Self {
        Metric::new(format_percent(pct), format_evolution(evolution_pct))
    }

    /// A unit price with cents.
    pub fn price(euros: f64, evolution_pct: f64) -> Self {
        Metric::new(format_price(euros), format_evolution(evolution_pct))
    }

    pub fn unit(&self) -> MetricUnit {
        parse_metric(&self.value).unit
    }

    /// Numeric value in the metric's own unit. Unreadable values count as 0.
    pub fn numeric_value(&self) -> f64 {
        parse_metric(&self.value).value
    }

    /// Value converted to euros for currency metrics, raw value otherwise.
    pub fn in_euros(&self) -> f64 {
        let parsed = parse_metric(&self.value);
        parsed.value * parsed.unit.scale()
    }

    pub fn evolution_pct(&self) -> f64 {
        parse_metric(&self.evolution).value
    }

    /// Multiplies the value by `factor`; unit, precision and evolution are kept.
    pub fn scaled(&self, factor: f64) -> Self {
        Metric {
            value: rescale(&self.value, factor),
            evolution: self.evolution.clone(),
        }
    }

    /// Replaces the value with `value` expressed in the current unit and precision.
    pub fn with_value(&self, value: f64) -> Self {
        let parsed = parse_metric(&self.value);
        Metric {
            value: format_in_unit(value, parsed.unit, parsed.decimals),
            evolution: self.evolution.clone(),
        }
    }
}
