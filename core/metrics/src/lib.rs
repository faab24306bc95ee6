//! FILENAME: core/metrics/src/lib.rs
//! PURPOSE: Shared metric types for the perimeter engine.
//! CONTEXT: Formatted metric values, unit formatting / lenient parsing, and
//! the deterministic metric generator used to build the catalog.

pub mod generator;
pub mod metric;
pub mod number_format;

// Re-export commonly used types at the crate root
pub use generator::{
    ean13, ean_check_digit, generate_coherent_metrics, generate_figures, generate_product_pricing,
    is_valid_ean13, margin_vs_competitor, margin_vs_sell_price, seeded_between, seeded_draw,
    seeded_evolution, seeded_pick, seeded_unit, CoherentMetrics, Evolutions, GeneratedFigures,
    MarginBands, MarginProfile, ProductPricing, PURCHASE_COST_RATIO, THEORETICAL_COST_JITTER,
};
pub use metric::Metric;
pub use number_format::{
    convert, format_amount, format_evolution, format_in_unit, format_percent, format_price,
    parse_amount, parse_metric, parse_number, rescale, MetricUnit, ParsedMetric,
};
