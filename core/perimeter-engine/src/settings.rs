//! FILENAME: core/perimeter-engine/src/settings.rs
//! Engine settings, loaded from JSON. Every field has a default, so `{}` is a
//! valid settings document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adjust::Calibration;
use crate::error::{PerimeterError, Result};
use crate::log_info;

pub const DEFAULT_SEED: u64 = 2024;
pub const DEFAULT_PRODUCTS_PER_SUB_FAMILY: usize = 4;
pub const MAX_PRODUCTS_PER_SUB_FAMILY: usize = 24;

/// How non-product rows get their figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevenueRollup {
    /// Rolled up from the products below, so child sums match parent totals.
    #[default]
    BottomUp,
    /// Each node seeded on its own through the generator.
    IndependentSeeds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    pub seed: u64,
    pub products_per_sub_family: usize,
    pub rollup: RevenueRollup,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            seed: DEFAULT_SEED,
            products_per_sub_family: DEFAULT_PRODUCTS_PER_SUB_FAMILY,
            rollup: RevenueRollup::default(),
        }
    }
}

impl CatalogSettings {
    /// Products per sub-family, clamped to `1..=24`.
    pub fn products_per_sub_family(&self) -> usize {
        self.products_per_sub_family.clamp(1, MAX_PRODUCTS_PER_SUB_FAMILY)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    pub catalog: CatalogSettings,
    pub calibration: Calibration,
    /// When set, `Perimeter::from_settings` opens the log file here.
    pub log_file: Option<PathBuf>,
}

impl EngineSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: EngineSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = EngineSettings::from_json_str(&content)?;
        log_info!("SETTINGS", "loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let requested = self.catalog.products_per_sub_family;
        if requested == 0 || requested > MAX_PRODUCTS_PER_SUB_FAMILY {
            log_info!(
                "SETTINGS",
                "productsPerSubFamily {} clamped to {}",
                requested,
                self.catalog.products_per_sub_family()
            );
        }
        if let Some(path) = &self.log_file {
            if path.as_os_str().is_empty() {
                return Err(PerimeterError::InvalidSettings("logFile is empty".to_string()));
            }
        }
        self.calibration.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let settings = EngineSettings::from_json_str("{}").unwrap();
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.catalog.seed, DEFAULT_SEED);
        assert_eq!(settings.catalog.rollup, RevenueRollup::BottomUp);
        assert_eq!(settings.calibration.country("Italie").revenue_multiplier, 0.06);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let json = r#"{
            "catalog": { "seed": 7, "rollup": "independentSeeds" },
            "calibration": { "supplier": { "revenueMultiplier": 0.2, "mpaDelta": 0.0, "mpiDelta": 0.0 } }
        }"#;
        let settings = EngineSettings::from_json_str(json).unwrap();
        assert_eq!(settings.catalog.seed, 7);
        assert_eq!(settings.catalog.products_per_sub_family, DEFAULT_PRODUCTS_PER_SUB_FAMILY);
        assert_eq!(settings.catalog.rollup, RevenueRollup::IndependentSeeds);
        assert_eq!(settings.calibration.supplier.revenue_multiplier, 0.2);
        assert_eq!(settings.calibration.portfolio.revenue_multiplier, 0.25);
        assert_eq!(settings.calibration.countries.len(), 5);
    }

    #[test]
    fn country_entries_are_flat() {
        let json = r#"{ "calibration": { "countries": [
            { "country": "Portugal", "revenueMultiplier": 0.03, "mpaDelta": 0.5, "mpiDelta": 0.0 }
        ] } }"#;
        let settings = EngineSettings::from_json_str(json).unwrap();
        assert_eq!(settings.calibration.country("Portugal").revenue_multiplier, 0.03);
        // France no longer listed: falls back to the unknown-country entry
        assert_eq!(settings.calibration.country("France").revenue_multiplier, 0.05);
    }

    #[test]
    fn rejects_negative_multiplier() {
        let json = r#"{ "calibration": { "portfolio": { "revenueMultiplier": -1.0, "mpaDelta": 0.0, "mpiDelta": 0.0 } } }"#;
        match EngineSettings::from_json_str(json) {
            Err(PerimeterError::InvalidSettings(msg)) => assert!(msg.contains("portfolio")),
            other => panic!("expected InvalidSettings, got {:?}", other),
        }
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            EngineSettings::from_json_str("{ not json"),
            Err(PerimeterError::Json(_))
        ));
    }

    #[test]
    fn products_per_sub_family_is_clamped() {
        let mut catalog = CatalogSettings::default();
        catalog.products_per_sub_family = 0;
        assert_eq!(catalog.products_per_sub_family(), 1);
        catalog.products_per_sub_family = 100;
        assert_eq!(catalog.products_per_sub_family(), MAX_PRODUCTS_PER_SUB_FAMILY);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "catalog": {{ "productsPerSubFamily": 2 }} }}"#).unwrap();
        let settings = EngineSettings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.catalog.products_per_sub_family, 2);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            EngineSettings::load_from_file(&missing),
            Err(PerimeterError::Io(_))
        ));
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = EngineSettings::default();
        let json = settings.to_json_string().unwrap();
        assert!(json.contains("\"productsPerSubFamily\": 4"));
        assert!(json.contains("\"rollup\": \"bottomUp\""));

        let back = EngineSettings::from_json_str(&json).unwrap();
        assert_eq!(back.catalog, settings.catalog);
        assert_eq!(back.calibration.countries.len(), settings.calibration.countries.len());
    }
}
