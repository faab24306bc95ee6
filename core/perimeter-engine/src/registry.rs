//! FILENAME: core/perimeter-engine/src/registry.rs
//! Perimeter Registry - per-level configuration and the `Perimeter` facade.
//!
//! `Perimeter` is the single entry point for callers: it owns the catalog,
//! the calibration, one `PerimeterConfig` per level and the sub-level cache.
//! Every query is synchronous and performs no I/O.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::adjust::{adjust_resolved, Calibration};
use crate::cache::{CacheKey, CacheStats, SubLevelCache};
use crate::catalog::Catalog;
use crate::counter::sub_level_counts;
use crate::definition::{ColumnDef, ColumnKind, FilterSet, PerimeterItem, ResolvedFilters};
use crate::error::Result;
use crate::level::{FilterKey, PerimeterLevel, ALL_LEVELS};
use crate::logging::init_log_file;
use crate::settings::{CatalogSettings, EngineSettings};
use crate::{log_debug, log_enter, log_error, log_exit, log_info, log_warn};

// ============================================================================
// LEVEL CONFIGURATION
// ============================================================================

const CROSS_KEYS: [FilterKey; 3] = [FilterKey::Fournisseur, FilterKey::Portefeuille, FilterKey::Pays];

fn available_filter_keys(level: PerimeterLevel) -> &'static [FilterKey] {
    use FilterKey::*;
    match level {
        PerimeterLevel::Market => &[Marche, Fournisseur, Portefeuille, Pays],
        PerimeterLevel::DetailedMarket => &[MarcheDetaille, Marche, Fournisseur, Portefeuille, Pays],
        PerimeterLevel::Category => &[
            Categorie, Marche, MarcheDetaille, Fournisseur, Portefeuille, Pays,
        ],
        PerimeterLevel::GroupFamily => &[
            GroupeFamille, Marche, MarcheDetaille, Categorie, Fournisseur, Portefeuille, Pays,
        ],
        PerimeterLevel::Family => &[
            Famille, Marche, MarcheDetaille, Categorie, GroupeFamille, Fournisseur, Portefeuille,
            Pays,
        ],
        PerimeterLevel::SubFamily => &[
            SousFamille, Marche, MarcheDetaille, Categorie, GroupeFamille, Famille, Fournisseur,
            Portefeuille, Pays,
        ],
        PerimeterLevel::Product => &[
            Marche, MarcheDetaille, Categorie, GroupeFamille, Famille, SousFamille, Fournisseur,
            Portefeuille, Pays,
        ],
        PerimeterLevel::Supplier => &CROSS_KEYS,
        PerimeterLevel::Portfolio => &[Portefeuille, Fournisseur, Pays],
        PerimeterLevel::Country => &[Pays, Fournisseur, Portefeuille],
    }
}

fn linked_levels(level: PerimeterLevel) -> &'static [PerimeterLevel] {
    use PerimeterLevel::*;
    match level {
        Market => &[DetailedMarket, Category, Supplier, Country],
        DetailedMarket => &[Market, Category, Supplier],
        Category => &[DetailedMarket, GroupFamily, Supplier, Portfolio],
        GroupFamily => &[Category, Family],
        Family => &[GroupFamily, SubFamily],
        SubFamily => &[Family, Product],
        Product => &[SubFamily, Supplier, Portfolio, Country],
        Supplier => &[Product, Portfolio, Country],
        Portfolio => &[Supplier, Category],
        Country => &[Market, Supplier],
    }
}

fn columns(level: PerimeterLevel) -> Vec<ColumnDef> {
    let mut columns = vec![
        ColumnDef::new("label", level.display_name(), ColumnKind::Text),
        ColumnDef::new("ca", "CA", ColumnKind::Amount),
        ColumnDef::new("mpa", "MPA", ColumnKind::Percent),
        ColumnDef::new("mpi", "MPI", ColumnKind::Percent),
        ColumnDef::new("evoPa", "PA", ColumnKind::Amount),
        ColumnDef::new("theoreticalCost", "Coût théorique", ColumnKind::Amount),
        ColumnDef::new("opportunity", "Opportunité", ColumnKind::Amount),
    ];
    if level == PerimeterLevel::Product {
        columns.extend([
            ColumnDef::new("pv", "PV", ColumnKind::Price),
            ColumnDef::new("pvLeclerc", "PV concurrent", ColumnKind::Price),
            ColumnDef::new("marginVsSellPrice", "Marge / PV", ColumnKind::Percent),
            ColumnDef::new("marginVsCompetitor", "Marge / concurrent", ColumnKind::Percent),
            ColumnDef::new("ean", "EAN", ColumnKind::Code),
        ]);
    }
    columns
}

/// What a level exposes: filters, navigation, columns, and its row query.
#[derive(Debug, Clone)]
pub struct PerimeterConfig {
    pub level: PerimeterLevel,
    pub columns: Vec<ColumnDef>,
}

impl PerimeterConfig {
    pub fn new(level: PerimeterLevel) -> Self {
        PerimeterConfig {
            level,
            columns: columns(level),
        }
    }

    /// Own key first, then chain ancestors (Market first), then the
    /// cross-cutting keys.
    pub fn available_filter_keys(&self) -> &'static [FilterKey] {
        available_filter_keys(self.level)
    }

    /// Suggested navigation targets.
    pub fn linked_levels(&self) -> &'static [PerimeterLevel] {
        linked_levels(self.level)
    }

    /// Catalog lookup, then structural filter and scalar adjustment.
    pub fn rows(
        &self,
        catalog: &Catalog,
        resolved: &ResolvedFilters,
        calibration: &Calibration,
    ) -> Vec<PerimeterItem> {
        adjust_resolved(catalog.rows(self.level), resolved, self.level, calibration)
    }
}

/// One config per level.
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    configs: Vec<PerimeterConfig>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        ConfigRegistry {
            configs: ALL_LEVELS.iter().map(|&level| PerimeterConfig::new(level)).collect(),
        }
    }

    pub fn get(&self, level: PerimeterLevel) -> &PerimeterConfig {
        &self.configs[level.index()]
    }

    /// Config for a level name; unknown names are logged and yield `None`.
    pub fn by_name(&self, name: &str) -> Option<&PerimeterConfig> {
        match name.parse::<PerimeterLevel>() {
            Ok(level) => Some(self.get(level)),
            Err(e) => {
                log_warn!("REGISTRY", "{}", e);
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PerimeterConfig> {
        self.configs.iter()
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        ConfigRegistry::new()
    }
}

// ============================================================================
// FACADE
// ============================================================================

pub struct Perimeter {
    catalog: Arc<Catalog>,
    calibration: Calibration,
    registry: ConfigRegistry,
    cache: SubLevelCache,
}

impl Perimeter {
    /// Engine over the default catalog and calibration.
    pub fn new() -> Self {
        Perimeter::with_catalog(Arc::new(Catalog::default()), Calibration::default())
    }

    /// Validates the settings, opens the log file if one is configured, and
    /// builds the catalog.
    pub fn from_settings(settings: &EngineSettings) -> Result<Self> {
        settings.validate()?;
        if let Some(path) = &settings.log_file {
            init_log_file(path)?;
        }
        let catalog = Catalog::build(&settings.catalog);
        let perimeter = Perimeter::with_catalog(Arc::new(catalog), settings.calibration.clone());
        perimeter.log_shape();
        Ok(perimeter)
    }

    /// Engine sharing an existing catalog. The cache starts empty.
    /// An invalid calibration is logged and replaced by the default table.
    pub fn with_catalog(catalog: Arc<Catalog>, calibration: Calibration) -> Self {
        let calibration = match calibration.validate() {
            Ok(()) => calibration,
            Err(e) => {
                log_error!("REGISTRY", "{}; using the default calibration", e);
                Calibration::default()
            }
        };
        Perimeter {
            catalog,
            calibration,
            registry: ConfigRegistry::new(),
            cache: SubLevelCache::new(),
        }
    }

    pub fn config(&self, level: PerimeterLevel) -> &PerimeterConfig {
        self.registry.get(level)
    }

    fn log_shape(&self) {
        for config in self.registry.iter() {
            log_info!(
                "REGISTRY",
                "{}: {} rows, {} filters, {} columns",
                config.level,
                self.catalog.len(config.level),
                config.available_filter_keys().len(),
                config.columns.len()
            );
        }
    }

    pub fn registry(&self) -> &ConfigRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Regenerates the catalog and drops every cached row set.
    pub fn rebuild_catalog(&mut self, settings: &CatalogSettings) {
        self.catalog = Arc::new(Catalog::build(settings));
        self.cache.clear();
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Rows of `level` under `filters`, computed fresh.
    pub fn get_perimetre_data(&self, level: PerimeterLevel, filters: &FilterSet) -> Vec<PerimeterItem> {
        log_enter!("QUERY", "get_perimetre_data", "level={} filters={}", level, filters.active_count());
        let resolved = self.catalog.resolve_filters(filters);
        let rows = self.config(level).rows(&self.catalog, &resolved, &self.calibration);
        log_exit!("QUERY", "get_perimetre_data", "{} rows", rows.len());
        rows
    }

    pub fn get_available_filters(&self, level: PerimeterLevel) -> &'static [FilterKey] {
        self.config(level).available_filter_keys()
    }

    pub fn get_linked_perimetres(&self, level: PerimeterLevel) -> &'static [PerimeterLevel] {
        self.config(level).linked_levels()
    }

    pub fn get_sub_levels(&self, level: PerimeterLevel) -> &'static [PerimeterLevel] {
        level.descendant_levels()
    }

    /// Rows below `item` per descendant level, under `filters`.
    /// The filtered row sets are memoized per (level, filters).
    pub fn calculate_sub_level_counts(
        &self,
        level: PerimeterLevel,
        item: &PerimeterItem,
        filters: &FilterSet,
    ) -> BTreeMap<PerimeterLevel, usize> {
        let resolved = self.catalog.resolve_filters(filters);
        let counts = sub_level_counts(level, item, |descendant| {
            self.cached_rows(descendant, &resolved)
        });
        log_debug!("COUNTS", "{} {}: {:?}", level, item.id, counts);
        counts
    }

    pub fn clear_sub_level_cache(&self) {
        self.cache.clear();
    }

    fn cached_rows(&self, level: PerimeterLevel, resolved: &ResolvedFilters) -> Arc<Vec<PerimeterItem>> {
        let key = CacheKey::new(level, &resolved.to_filter_set());
        self.cache.get_or_compute(key, || {
            self.config(level).rows(&self.catalog, resolved, &self.calibration)
        })
    }

    // ------------------------------------------------------------------------
    // By-name variants: unknown names are logged and yield no data
    // ------------------------------------------------------------------------

    pub fn get_perimetre_data_by_name(&self, level: &str, filters: &FilterSet) -> Vec<PerimeterItem> {
        match self.registry.by_name(level) {
            Some(config) => self.get_perimetre_data(config.level, filters),
            None => Vec::new(),
        }
    }

    pub fn get_available_filters_by_name(&self, level: &str) -> &'static [FilterKey] {
        self.registry
            .by_name(level)
            .map(|config| config.available_filter_keys())
            .unwrap_or(&[])
    }

    pub fn get_linked_perimetres_by_name(&self, level: &str) -> &'static [PerimeterLevel] {
        self.registry
            .by_name(level)
            .map(|config| config.linked_levels())
            .unwrap_or(&[])
    }

    pub fn get_sub_levels_by_name(&self, level: &str) -> &'static [PerimeterLevel] {
        self.registry
            .by_name(level)
            .map(|config| config.level.descendant_levels())
            .unwrap_or(&[])
    }

    pub fn calculate_sub_level_counts_by_name(
        &self,
        level: &str,
        item: &PerimeterItem,
        filters: &FilterSet,
    ) -> BTreeMap<PerimeterLevel, usize> {
        match self.registry.by_name(level) {
            Some(config) => self.calculate_sub_level_counts(config.level, item, filters),
            None => BTreeMap::new(),
        }
    }
}

impl Default for Perimeter {
    fn default() -> Self {
        Perimeter::new()
    }
}

impl std::fmt::Debug for Perimeter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Perimeter")
            .field("rows", &self.catalog.total_rows())
            .field("cache", &self.cache.stats())
            .finish()
    }
}
