//! FILENAME: core/perimeter-engine/src/adjust.rs
//! Filter Adjustment - restricts rows to the active filters and applies the
//! scalar corrections of the cross-cutting selections.
//!
//! Two independent steps:
//! 1. Structural filter: a filter restricts a row when it is the row's own
//!    key, or when the row carries a link for that dimension. Filters on a
//!    dimension the row has no link for are ignored.
//! 2. Scalar adjustment: country / supplier / portfolio selections multiply
//!    the amounts and shift the two margin percentages, using `Calibration`.

use serde::{Deserialize, Serialize};

use crate::definition::{FilterSet, PerimeterItem, ResolvedFilters};
use crate::error::{PerimeterError, Result};
use crate::level::{FilterKey, PerimeterLevel};
use crate::log_debug;

// ============================================================================
// CALIBRATION
// ============================================================================

/// Revenue multiplier and margin shifts of one selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalarAdjustment {
    pub revenue_multiplier: f64,
    /// Percentage points added to MPA.
    pub mpa_delta: f64,
    /// Percentage points added to MPI.
    pub mpi_delta: f64,
}

impl ScalarAdjustment {
    pub const IDENTITY: ScalarAdjustment = ScalarAdjustment::new(1.0, 0.0, 0.0);

    pub const fn new(revenue_multiplier: f64, mpa_delta: f64, mpi_delta: f64) -> Self {
        ScalarAdjustment {
            revenue_multiplier,
            mpa_delta,
            mpi_delta,
        }
    }

    /// Multipliers multiply, deltas add.
    pub fn compose(self, other: ScalarAdjustment) -> ScalarAdjustment {
        ScalarAdjustment {
            revenue_multiplier: self.revenue_multiplier * other.revenue_multiplier,
            mpa_delta: self.mpa_delta + other.mpa_delta,
            mpi_delta: self.mpi_delta + other.mpi_delta,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == ScalarAdjustment::IDENTITY
    }

    /// Non-finite multiplier replaced by 1, non-finite deltas by 0.
    pub fn sanitized(self) -> ScalarAdjustment {
        let finite_or = |value: f64, fallback: f64| if value.is_finite() { value } else { fallback };
        ScalarAdjustment {
            revenue_multiplier: finite_or(self.revenue_multiplier, 1.0),
            mpa_delta: finite_or(self.mpa_delta, 0.0),
            mpi_delta: finite_or(self.mpi_delta, 0.0),
        }
    }

    fn validate(&self, what: &str) -> Result<()> {
        let m = self.revenue_multiplier;
        if !m.is_finite() || m < 0.0 {
            return Err(PerimeterError::InvalidSettings(format!(
                "{}: revenue multiplier must be a finite non-negative number, got {}",
                what, m
            )));
        }
        if !self.mpa_delta.is_finite() || !self.mpi_delta.is_finite() {
            return Err(PerimeterError::InvalidSettings(format!(
                "{}: margin deltas must be finite",
                what
            )));
        }
        Ok(())
    }
}

impl Default for ScalarAdjustment {
    fn default() -> Self {
        ScalarAdjustment::IDENTITY
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryCalibration {
    /// Country label, compared case-insensitively.
    pub country: String,
    #[serde(flatten)]
    pub adjustment: ScalarAdjustment,
}

impl CountryCalibration {
    pub fn new(country: &str, revenue_multiplier: f64, mpa_delta: f64, mpi_delta: f64) -> Self {
        CountryCalibration {
            country: country.to_string(),
            adjustment: ScalarAdjustment::new(revenue_multiplier, mpa_delta, mpi_delta),
        }
    }
}

/// Scalar corrections per cross-cutting selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Calibration {
    pub countries: Vec<CountryCalibration>,
    /// Used for a country absent from `countries`.
    pub unknown_country: ScalarAdjustment,
    /// Used for any selected supplier.
    pub supplier: ScalarAdjustment,
    /// Used for any selected portfolio.
    pub portfolio: ScalarAdjustment,
}

impl Default for Calibration {
    fn default() -> Self {
        Calibration {
            countries: vec![
                CountryCalibration::new("France", 0.70, 2.5, 0.0),
                CountryCalibration::new("Allemagne", 0.12, -1.0, 0.5),
                CountryCalibration::new("Espagne", 0.08, 1.0, -0.5),
                CountryCalibration::new("Italie", 0.06, 0.5, 0.0),
                CountryCalibration::new("Belgique", 0.04, 0.0, 0.5),
            ],
            unknown_country: ScalarAdjustment::new(0.05, 0.0, 0.0),
            supplier: ScalarAdjustment::new(0.10, -1.5, 1.0),
            portfolio: ScalarAdjustment::new(0.25, 0.5, 0.0),
        }
    }
}

impl Calibration {
    /// Adjustment for a country label; unknown countries get `unknown_country`.
    pub fn country(&self, label: &str) -> ScalarAdjustment {
        let label = label.trim();
        self.countries
            .iter()
            .find(|entry| entry.country.trim().eq_ignore_ascii_case(label))
            .map_or(self.unknown_country, |entry| entry.adjustment)
    }

    pub fn validate(&self) -> Result<()> {
        for entry in &self.countries {
            entry.adjustment.validate(&format!("country {}", entry.country))?;
        }
        self.unknown_country.validate("unknown country")?;
        self.supplier.validate("supplier")?;
        self.portfolio.validate("portfolio")?;
        Ok(())
    }
}

// ============================================================================
// ADJUSTMENT
// ============================================================================

/// Composes the adjustments of the active cross-cutting filters.
pub fn scalar_adjustment(filters: &FilterSet, calibration: &Calibration) -> ScalarAdjustment {
    let mut adjustment = ScalarAdjustment::IDENTITY;
    if let Some(country) = filters.active(FilterKey::Pays) {
        adjustment = adjustment.compose(calibration.country(country));
    }
    if filters.active(FilterKey::Fournisseur).is_some() {
        adjustment = adjustment.compose(calibration.supplier);
    }
    if filters.active(FilterKey::Portefeuille).is_some() {
        adjustment = adjustment.compose(calibration.portfolio);
    }
    adjustment
}

/// True when `item` passes every active filter that applies to it.
pub fn passes_filters(item: &PerimeterItem, filters: &FilterSet, level: PerimeterLevel) -> bool {
    let own_key = level.filter_key();
    filters.iter_active().all(|(key, value)| {
        if Some(key) == own_key {
            return item.id == value || item.label == value;
        }
        match item.link(key.level()) {
            Some(node) => node.matches(value),
            None => true,
        }
    })
}

/// Keeps the rows passing the active filters, in catalog order.
pub fn structural_filter(
    rows: &[PerimeterItem],
    filters: &FilterSet,
    level: PerimeterLevel,
) -> Vec<PerimeterItem> {
    rows.iter()
        .filter(|item| passes_filters(item, filters, level))
        .cloned()
        .collect()
}

/// Applies one adjustment to one row in place.
///
/// Amounts are rescaled with their unit and precision kept; opportunity stays
/// non-negative. Margins are clamped to [0, 100] with MPI capped at 100 - MPA.
/// A non-finite multiplier counts as 1 and a non-finite delta as 0.
pub fn apply_scalar(item: &mut PerimeterItem, adjustment: ScalarAdjustment) {
    let adjustment = adjustment.sanitized();
    let factor = adjustment.revenue_multiplier;
    if factor != 1.0 {
        item.revenue = item.revenue.scaled(factor);
        item.purchase_cost = item.purchase_cost.scaled(factor);
        item.theoretical_cost = item.theoretical_cost.scaled(factor);
        item.opportunity = item.opportunity.scaled(factor);
        if item.opportunity.numeric_value() < 0.0 {
            item.opportunity = item.opportunity.with_value(0.0);
        }
    }

    if adjustment.mpa_delta != 0.0 || adjustment.mpi_delta != 0.0 {
        let mpa = (item.raw_material_margin.numeric_value() + adjustment.mpa_delta)
            .max(0.0)
            .min(100.0);
        let current_mpi = item.packaging_margin.numeric_value();
        let mpi = (current_mpi + adjustment.mpi_delta).max(0.0).min(100.0 - mpa);

        if adjustment.mpa_delta != 0.0 {
            item.raw_material_margin = item.raw_material_margin.with_value(mpa);
        }
        if adjustment.mpi_delta != 0.0 || mpi != current_mpi {
            item.packaging_margin = item.packaging_margin.with_value(mpi);
        }
    }
}

/// Structural filter followed by the scalar adjustment of `filters`.
///
/// Filter values are matched against ids and labels. Country calibration is
/// looked up by label.
pub fn adjust(
    rows: &[PerimeterItem],
    filters: &FilterSet,
    level: PerimeterLevel,
    calibration: &Calibration,
) -> Vec<PerimeterItem> {
    adjust_with(rows, filters, filters, level, calibration)
}

/// `adjust` over filters already resolved against the catalog: rows are
/// joined on node ids, calibration is looked up by node label.
pub fn adjust_resolved(
    rows: &[PerimeterItem],
    resolved: &ResolvedFilters,
    level: PerimeterLevel,
    calibration: &Calibration,
) -> Vec<PerimeterItem> {
    adjust_with(
        rows,
        &resolved.to_filter_set(),
        &resolved.to_label_set(),
        level,
        calibration,
    )
}

fn adjust_with(
    rows: &[PerimeterItem],
    structural: &FilterSet,
    scalar: &FilterSet,
    level: PerimeterLevel,
    calibration: &Calibration,
) -> Vec<PerimeterItem> {
    let mut kept = structural_filter(rows, structural, level);
    let adjustment = scalar_adjustment(scalar, calibration);

    if !adjustment.is_identity() {
        for item in kept.iter_mut() {
            apply_scalar(item, adjustment);
        }
    }

    log_debug!(
        "ADJUST",
        "{}: kept {}/{} rows, x{:.4} mpa{:+.1} mpi{:+.1}",
        level,
        kept.len(),
        rows.len(),
        adjustment.revenue_multiplier,
        adjustment.mpa_delta,
        adjustment.mpi_delta
    );
    kept
}
