//! FILENAME: core/perimeter-engine/src/lib.rs
//! Perimeter engine: hierarchical aggregation over a product catalog.
//!
//! Market -> Detailed market -> Category -> Group family -> Family ->
//! Sub-family -> Product, plus the cross-cutting supplier, portfolio and
//! country dimensions tagged on every product.
//!
//! Layers:
//! - `level` / `definition`: the levels, rows and filters (what callers see)
//! - `catalog`: the immutable generated rows of every level
//! - `adjust`: structural filtering and scalar calibration of a query
//! - `cache` / `counter`: memoized sub-level counting for drill-down
//! - `registry`: per-level configuration and the `Perimeter` facade
//! - `view`: sorting and totals over query results

pub mod adjust;
pub mod cache;
pub mod catalog;
pub mod counter;
pub mod definition;
pub mod error;
pub mod level;
pub mod logging;
pub mod registry;
pub mod seeds;
pub mod settings;
pub mod view;

pub use adjust::{
    adjust, adjust_resolved, apply_scalar, scalar_adjustment, structural_filter, Calibration,
    CountryCalibration, ScalarAdjustment,
};
pub use cache::{CacheKey, CacheStats, SubLevelCache};
pub use catalog::Catalog;
pub use counter::sub_level_counts;
pub use definition::{
    Ancestry, ColumnDef, ColumnKind, FilterSet, NodeRef, PerimeterItem, ProductDetails,
    ResolvedFilters, ALL,
};
pub use error::{PerimeterError, Result};
pub use logging::{close_log_file, init_log_file, next_seq, sort_log_file, write_log};
pub use level::{
    FilterKey, PerimeterLevel, ALL_FILTER_KEYS, ALL_LEVELS, CROSS_CUTTING_LEVELS, HIERARCHY_CHAIN,
};
pub use registry::{ConfigRegistry, Perimeter, PerimeterConfig};
pub use settings::{CatalogSettings, EngineSettings, RevenueRollup};
pub use view::{sort_rows, summarize, top_row, PerimeterTotals, SortColumn, SortOrder};

pub use metrics::Metric;
