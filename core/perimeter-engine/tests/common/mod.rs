//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for perimeter engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use once_cell::sync::Lazy;
use perimeter_engine::{
    Calibration, Catalog, FilterKey, FilterSet, Perimeter, PerimeterItem, PerimeterLevel,
};

/// Catalog shared by every harness of a test binary.
static CATALOG: Lazy<Arc<Catalog>> = Lazy::new(|| Arc::new(Catalog::default()));

pub fn shared_catalog() -> Arc<Catalog> {
    Arc::clone(&CATALOG)
}

/// Test harness wrapping an isolated engine (own cache, shared catalog).
pub struct TestHarness {
    pub perimeter: Perimeter,
}

impl TestHarness {
    /// Create a new harness over the default catalog and calibration.
    pub fn new() -> Self {
        TestHarness {
            perimeter: Perimeter::with_catalog(shared_catalog(), Calibration::default()),
        }
    }

    /// Rows of `level` straight from the catalog, unfiltered and unadjusted.
    pub fn catalog_rows(&self, level: PerimeterLevel) -> &[PerimeterItem] {
        self.perimeter.catalog().rows(level)
    }

    /// The catalog row of `level` with this id or label.
    pub fn node(&self, level: PerimeterLevel, value: &str) -> PerimeterItem {
        self.perimeter
            .catalog()
            .find(level, value)
            .cloned()
            .unwrap_or_else(|| panic!("no {} named {}", level, value))
    }

    pub fn query(&self, level: PerimeterLevel, filters: &FilterSet) -> Vec<PerimeterItem> {
        self.perimeter.get_perimetre_data(level, filters)
    }
}

/// Filter set built from (key, value) pairs.
pub fn filters(pairs: &[(FilterKey, &str)]) -> FilterSet {
    pairs
        .iter()
        .fold(FilterSet::new(), |set, (key, value)| set.with(*key, *value))
}

/// Parses the leading number of a tag such as "10 CAT".
pub fn tag_count(item: &PerimeterItem, suffix: &str) -> Option<usize> {
    item.tags
        .iter()
        .find_map(|tag| tag.strip_suffix(suffix))
        .and_then(|n| n.trim().parse().ok())
}

/// Asserts two floats are within `tolerance`.
pub fn assert_close(actual: f64, expected: f64, tolerance: f64, what: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{}: expected {} (+/- {}), got {}",
        what,
        expected,
        tolerance,
        actual
    );
}
