//! FILENAME: core/perimeter-engine/src/catalog.rs
//! Perimeter Catalog - the immutable rows of every level.
//!
//! Built once from the static seed tree:
//! 1. Walk the tree, assigning stable ids and ancestor links
//! 2. Generate each product's figures from its own seed
//! 3. Derive every other row, either rolled up from its products or seeded
//!    on its own (see `RevenueRollup`)
//!
//! Lookups by id or label are O(1) through a per-level index. Labels also
//! match case-insensitively, as the calibration table does.

use metrics::{
    generate_figures, generate_product_pricing, seeded_draw, seeded_pick, Evolutions,
    GeneratedFigures, Metric, ProductPricing,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::definition::{
    Ancestry, FilterSet, NodeRef, PerimeterItem, ProductDetails, ResolvedFilters,
};
use crate::level::{PerimeterLevel, ALL_LEVELS};
use crate::seeds::{COUNTRIES, MARKETS, PORTFOLIOS, PRODUCT_VARIANTS, SUPPLIERS};
use crate::settings::{CatalogSettings, RevenueRollup};
use crate::{log_debug, log_info};

const SALT_BASE_REVENUE: f64 = 18.43;
const SALT_SUPPLIER: f64 = 19.61;
const SALT_COUNTRY: f64 = 20.17;
const SALT_COUNTRY_PICK: f64 = 21.83;

/// Share of products sold in the home market (first entry of `COUNTRIES`).
const HOME_MARKET_SHARE: f64 = 0.6;

/// Each category draws its products' suppliers from this many consecutive suppliers.
const SUPPLIERS_PER_CATEGORY: usize = 3;

const PRODUCT_BASE_MIN: f64 = 200_000.0;
const PRODUCT_BASE_SPREAD: f64 = 2_800_000.0;

/// Base revenue of a node seeded on its own.
fn independent_base(level: PerimeterLevel) -> f64 {
    match level {
        PerimeterLevel::Market => 900_000_000.0,
        PerimeterLevel::DetailedMarket => 350_000_000.0,
        PerimeterLevel::Category => 60_000_000.0,
        PerimeterLevel::GroupFamily => 25_000_000.0,
        PerimeterLevel::Family => 10_000_000.0,
        PerimeterLevel::SubFamily => 4_000_000.0,
        PerimeterLevel::Product => PRODUCT_BASE_MIN + PRODUCT_BASE_SPREAD / 2.0,
        PerimeterLevel::Supplier => 45_000_000.0,
        PerimeterLevel::Portfolio => 120_000_000.0,
        PerimeterLevel::Country => 200_000_000.0,
    }
}

/// "MKT-01", "CAT-004", "PRD-00412".
pub fn node_id(level: PerimeterLevel, ordinal: usize) -> String {
    let width = match level {
        PerimeterLevel::Product => 5,
        PerimeterLevel::Category
        | PerimeterLevel::GroupFamily
        | PerimeterLevel::Family
        | PerimeterLevel::SubFamily => 3,
        _ => 2,
    };
    format!("{}-{:0width$}", level.id_prefix(), ordinal, width = width)
}

// ============================================================================
// ROLLUP
// ============================================================================

/// Accumulates product figures into a parent node.
/// Margins and evolutions are revenue-weighted.
#[derive(Debug, Clone, Default)]
struct RollupAccumulator {
    count: usize,
    revenue: f64,
    purchase_cost: f64,
    theoretical_cost: f64,
    raw_material_weighted: f64,
    packaging_weighted: f64,
    evolutions_weighted: Evolutions,
}

impl RollupAccumulator {
    fn add(&mut self, figures: &GeneratedFigures) {
        let weight = figures.revenue;
        let evo = &figures.evolutions;
        let acc = &mut self.evolutions_weighted;

        self.count += 1;
        self.revenue += figures.revenue;
        self.purchase_cost += figures.purchase_cost;
        self.theoretical_cost += figures.theoretical_cost;
        self.raw_material_weighted += figures.raw_material_margin_pct * weight;
        self.packaging_weighted += figures.packaging_margin_pct * weight;

        acc.revenue += evo.revenue * weight;
        acc.raw_material_margin += evo.raw_material_margin * weight;
        acc.packaging_margin += evo.packaging_margin * weight;
        acc.purchase_cost += evo.purchase_cost * weight;
        acc.theoretical_cost += evo.theoretical_cost * weight;
        acc.opportunity += evo.opportunity * weight;
    }

    fn finish(&self) -> GeneratedFigures {
        let weighted = |sum: f64| {
            if self.revenue > 0.0 {
                sum / self.revenue
            } else {
                0.0
            }
        };
        let acc = &self.evolutions_weighted;

        let raw_material_margin_pct = weighted(self.raw_material_weighted);
        let packaging_margin_pct = weighted(self.packaging_weighted);

        GeneratedFigures {
            revenue: self.revenue,
            raw_material_margin_pct,
            packaging_margin_pct,
            other_pct: (100.0 - raw_material_margin_pct - packaging_margin_pct).max(0.0),
            purchase_cost: self.purchase_cost,
            theoretical_cost: self.theoretical_cost,
            opportunity: (self.purchase_cost - self.theoretical_cost).max(0.0),
            evolutions: Evolutions {
                revenue: weighted(acc.revenue),
                raw_material_margin: weighted(acc.raw_material_margin),
                packaging_margin: weighted(acc.packaging_margin),
                purchase_cost: weighted(acc.purchase_cost),
                theoretical_cost: weighted(acc.theoretical_cost),
                opportunity: -weighted(acc.opportunity).abs(),
            },
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Links and positions of a node and everything above it.
#[derive(Debug, Clone, Default)]
struct Lineage {
    ancestors: Ancestry,
    positions: SmallVec<[(PerimeterLevel, usize); 9]>,
}

impl Lineage {
    fn child(&self, level: PerimeterLevel, position: usize, node: NodeRef) -> Lineage {
        let mut next = self.clone();
        next.ancestors.set(level, node);
        next.positions.push((level, position));
        next
    }
}

struct NodeDraft {
    node: NodeRef,
    ancestors: Ancestry,
    /// Text steering the margin profile.
    profile: &'static str,
    tags: Vec<String>,
}

struct ProductDraft {
    node: NodeRef,
    lineage: Lineage,
    tags: Vec<String>,
    figures: GeneratedFigures,
    pricing: ProductPricing,
}

struct CatalogBuilder<'a> {
    settings: &'a CatalogSettings,
    nodes: Vec<Vec<NodeDraft>>,
    products: Vec<ProductDraft>,
}

impl<'a> CatalogBuilder<'a> {
    fn new(settings: &'a CatalogSettings) -> Self {
        CatalogBuilder {
            settings,
            nodes: ALL_LEVELS.iter().map(|_| Vec::new()).collect(),
            products: Vec::new(),
        }
    }

    /// Adds a non-product node under `parent` and returns its own lineage.
    fn push(
        &mut self,
        level: PerimeterLevel,
        label: &str,
        parent: &Lineage,
        profile: &'static str,
        tags: Vec<String>,
    ) -> Lineage {
        let list = &mut self.nodes[level.index()];
        let position = list.len();
        let node = NodeRef::new(node_id(level, position + 1), label);
        list.push(NodeDraft {
            node: node.clone(),
            ancestors: parent.ancestors.clone(),
            profile,
            tags,
        });
        parent.child(level, position, node)
    }

    fn node(&self, level: PerimeterLevel, position: usize) -> NodeRef {
        self.nodes[level.index()][position].node.clone()
    }

    fn walk_tree(&mut self) {
        for label in SUPPLIERS {
            self.push(PerimeterLevel::Supplier, label, &Lineage::default(), label, Vec::new());
        }
        for label in PORTFOLIOS {
            self.push(PerimeterLevel::Portfolio, label, &Lineage::default(), label, Vec::new());
        }
        for label in COUNTRIES {
            self.push(PerimeterLevel::Country, label, &Lineage::default(), label, Vec::new());
        }

        let per_sub_family = self.settings.products_per_sub_family();
        let mut category_ordinal = 0;

        for market in MARKETS {
            let category_count: usize = market.detailed.iter().map(|d| d.categories.len()).sum();
            let market_line = self.push(
                PerimeterLevel::Market,
                market.label,
                &Lineage::default(),
                market.label,
                vec![
                    market.description.to_string(),
                    format!("{} MD", market.detailed.len()),
                    format!("{} CAT", category_count),
                ],
            );

            for detailed in market.detailed {
                let portfolio = PORTFOLIOS
                    .iter()
                    .position(|p| *p == detailed.portfolio)
                    .unwrap_or(0);
                let detailed_line = self.push(
                    PerimeterLevel::DetailedMarket,
                    detailed.label,
                    &market_line,
                    detailed.label,
                    vec![
                        market.label.to_string(),
                        format!("{} CAT", detailed.categories.len()),
                    ],
                );

                for category in detailed.categories {
                    let category_line = self.push(
                        PerimeterLevel::Category,
                        category.label,
                        &detailed_line,
                        category.label,
                        vec![
                            detailed.label.to_string(),
                            format!("{} GF", category.groups.len()),
                        ],
                    );

                    for group in category.groups {
                        let group_line = self.push(
                            PerimeterLevel::GroupFamily,
                            group.label,
                            &category_line,
                            category.label,
                            vec![
                                category.label.to_string(),
                                format!("{} FAM", group.families.len()),
                            ],
                        );

                        for family in group.families {
                            let family_line = self.push(
                                PerimeterLevel::Family,
                                family.label,
                                &group_line,
                                category.label,
                                vec![
                                    group.label.to_string(),
                                    format!("{} SF", family.sub_families.len()),
                                ],
                            );

                            for sub_family in family.sub_families {
                                let sub_family_line = self.push(
                                    PerimeterLevel::SubFamily,
                                    sub_family,
                                    &family_line,
                                    category.label,
                                    vec![
                                        family.label.to_string(),
                                        format!("{} produits", per_sub_family),
                                    ],
                                );

                                for variant in 0..per_sub_family {
                                    self.push_product(
                                        &sub_family_line,
                                        sub_family,
                                        variant,
                                        category.label,
                                        category_ordinal,
                                        portfolio,
                                    );
                                }
                            }
                        }
                    }
                    category_ordinal += 1;
                }
            }
        }
    }

    fn push_product(
        &mut self,
        parent: &Lineage,
        sub_family: &str,
        variant: usize,
        category: &str,
        category_ordinal: usize,
        portfolio: usize,
    ) {
        let position = self.products.len();
        let seed = self.settings.seed as f64 + position as f64 * 17.0 + 1.0;

        let base = PRODUCT_BASE_MIN + seeded_draw(seed, SALT_BASE_REVENUE) * PRODUCT_BASE_SPREAD;
        let figures = generate_figures(base, seed, category);
        let pricing = generate_product_pricing(seed, &figures);

        let supplier = (category_ordinal + seeded_pick(seed, SALT_SUPPLIER, SUPPLIERS_PER_CATEGORY))
            % SUPPLIERS.len();
        let country = if seeded_draw(seed, SALT_COUNTRY) < HOME_MARKET_SHARE {
            0
        } else {
            1 + seeded_pick(seed, SALT_COUNTRY_PICK, COUNTRIES.len() - 1)
        };

        let mut lineage = parent.clone();
        for (level, pos) in [
            (PerimeterLevel::Supplier, supplier),
            (PerimeterLevel::Portfolio, portfolio),
            (PerimeterLevel::Country, country),
        ] {
            lineage = lineage.child(level, pos, self.node(level, pos));
        }

        let variant_label = PRODUCT_VARIANTS[variant % PRODUCT_VARIANTS.len()];
        let label = if variant < PRODUCT_VARIANTS.len() {
            format!("{} {}", sub_family, variant_label)
        } else {
            format!("{} {} {}", sub_family, variant_label, variant / PRODUCT_VARIANTS.len() + 1)
        };

        let tags = vec![
            variant_label.to_string(),
            SUPPLIERS[supplier].to_string(),
            COUNTRIES[country].to_string(),
        ];

        self.products.push(ProductDraft {
            node: NodeRef::new(node_id(PerimeterLevel::Product, position + 1), label),
            lineage,
            tags,
            figures,
            pricing,
        });
    }

    fn finish(self) -> Catalog {
        let settings = self.settings.clone();

        let mut accumulators: Vec<Vec<RollupAccumulator>> = self
            .nodes
            .iter()
            .map(|list| vec![RollupAccumulator::default(); list.len()])
            .collect();
        for product in &self.products {
            for (level, position) in &product.lineage.positions {
                accumulators[level.index()][*position].add(&product.figures);
            }
        }

        let mut rows: Vec<Vec<PerimeterItem>> = vec![Vec::new(); ALL_LEVELS.len()];
        for level in ALL_LEVELS {
            let idx = level.index();
            if level == PerimeterLevel::Product {
                rows[idx] = self.products.iter().map(product_row).collect();
                continue;
            }
            rows[idx] = self.nodes[idx]
                .iter()
                .enumerate()
                .map(|(position, draft)| {
                    let accumulator = &accumulators[idx][position];
                    let figures = match settings.rollup {
                        RevenueRollup::BottomUp => accumulator.finish(),
                        RevenueRollup::IndependentSeeds => generate_figures(
                            independent_base(level),
                            independent_seed(&settings, level, position),
                            draft.profile,
                        ),
                    };
                    let mut tags = draft.tags.clone();
                    if level.is_cross_cutting() {
                        tags.push(format!("{} produits", accumulator.count));
                    }
                    item_from_figures(
                        level,
                        draft.node.clone(),
                        tags,
                        draft.ancestors.clone(),
                        &figures,
                        None,
                    )
                })
                .collect();
        }

        Catalog::from_rows(settings, rows)
    }
}

fn independent_seed(settings: &CatalogSettings, level: PerimeterLevel, position: usize) -> f64 {
    settings.seed as f64 + (level.index() * 1000 + position + 1) as f64
}

fn product_row(product: &ProductDraft) -> PerimeterItem {
    let pricing = &product.pricing;
    let details = ProductDetails {
        sell_price: Metric::price(pricing.sell_price, pricing.price_evolution),
        sell_price_competitor: Metric::price(pricing.sell_price_competitor, pricing.competitor_evolution),
        ean: pricing.ean.clone(),
        margin_vs_sell_price: pricing.margin_vs_sell_price.map(|m| Metric::percent(m, 0.0)),
        margin_vs_competitor: pricing.margin_vs_competitor.map(|m| Metric::percent(m, 0.0)),
    };
    item_from_figures(
        PerimeterLevel::Product,
        product.node.clone(),
        product.tags.clone(),
        product.lineage.ancestors.clone(),
        &product.figures,
        Some(details),
    )
}

fn item_from_figures(
    level: PerimeterLevel,
    node: NodeRef,
    tags: Vec<String>,
    ancestors: Ancestry,
    figures: &GeneratedFigures,
    product: Option<ProductDetails>,
) -> PerimeterItem {
    let metrics = figures.to_metrics();
    PerimeterItem {
        id: node.id,
        level,
        label: node.label,
        tags,
        revenue: metrics.ca,
        raw_material_margin: metrics.mpa,
        packaging_margin: metrics.mpi,
        purchase_cost: metrics.evo_pa,
        theoretical_cost: metrics.theoretical_cost,
        opportunity: metrics.opportunity,
        product,
        ancestors,
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Every row of every level. Immutable once built.
#[derive(Debug, Clone)]
pub struct Catalog {
    settings: CatalogSettings,
    rows: Vec<Vec<PerimeterItem>>,
    /// Per level: id and label -> row position.
    index: Vec<FxHashMap<String, usize>>,
    /// Per level: lower-cased label -> row position.
    folded: Vec<FxHashMap<String, usize>>,
}

impl Catalog {
    pub fn build(settings: &CatalogSettings) -> Catalog {
        let mut builder = CatalogBuilder::new(settings);
        builder.walk_tree();
        let catalog = builder.finish();

        log_info!(
            "CATALOG",
            "built catalog: seed={} rollup={:?} rows={} products={}",
            settings.seed,
            settings.rollup,
            catalog.total_rows(),
            catalog.len(PerimeterLevel::Product)
        );
        catalog
    }

    fn from_rows(settings: CatalogSettings, rows: Vec<Vec<PerimeterItem>>) -> Catalog {
        let mut index = Vec::with_capacity(rows.len());
        let mut folded = Vec::with_capacity(rows.len());
        for list in &rows {
            let mut exact = FxHashMap::default();
            let mut lower = FxHashMap::default();
            for (position, item) in list.iter().enumerate() {
                exact.insert(item.id.clone(), position);
                exact.entry(item.label.clone()).or_insert(position);
                lower.entry(item.label.to_lowercase()).or_insert(position);
            }
            index.push(exact);
            folded.push(lower);
        }
        Catalog {
            settings,
            rows,
            index,
            folded,
        }
    }

    pub fn settings(&self) -> &CatalogSettings {
        &self.settings
    }

    /// Rows of `level`, in tree order.
    pub fn rows(&self, level: PerimeterLevel) -> &[PerimeterItem] {
        &self.rows[level.index()]
    }

    pub fn len(&self, level: PerimeterLevel) -> usize {
        self.rows[level.index()].len()
    }

    pub fn total_rows(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// The row of `level` whose id or label is `value`. An exact match wins,
    /// otherwise the label is compared case-insensitively.
    pub fn find(&self, level: PerimeterLevel, value: &str) -> Option<&PerimeterItem> {
        let idx = level.index();
        let value = value.trim();
        self.index[idx]
            .get(value)
            .or_else(|| self.folded[idx].get(&value.to_lowercase()))
            .and_then(|&position| self.rows[idx].get(position))
    }

    /// Resolves each active filter value to the node it names.
    /// Values naming no node are kept as-is and match nothing.
    pub fn resolve_filters(&self, filters: &FilterSet) -> ResolvedFilters {
        let mut resolved = ResolvedFilters::new();
        for (key, value) in filters.iter_active() {
            let node = match self.find(key.level(), value) {
                Some(item) => item.node_ref(),
                None => {
                    log_debug!("CATALOG", "filter {}={} names no {}", key, value, key.level());
                    NodeRef::new(value, value)
                }
            };
            resolved.insert(key, node);
        }
        resolved
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::build(&CatalogSettings::default())
    }
}
