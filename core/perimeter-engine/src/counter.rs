//! FILENAME: core/perimeter-engine/src/counter.rs
//! Sub-level counts: how many rows of each descendant level sit under a node.
//!
//! Chain levels count the descendant rows linked to the node. Cross-cutting
//! levels (supplier, portfolio, country) first select the products tagged
//! with the node, then count the distinct ancestors of those products at
//! each level.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::definition::PerimeterItem;
use crate::level::PerimeterLevel;

/// Counts the rows below `item` for every descendant level of `level`.
///
/// `fetch` returns the filtered rows of a level, typically through the
/// sub-level cache. Every descendant level gets an entry, zero included.
pub fn sub_level_counts<F>(
    level: PerimeterLevel,
    item: &PerimeterItem,
    mut fetch: F,
) -> BTreeMap<PerimeterLevel, usize>
where
    F: FnMut(PerimeterLevel) -> Arc<Vec<PerimeterItem>>,
{
    let descendants = level.descendant_levels();
    if descendants.is_empty() {
        return BTreeMap::new();
    }

    if level.is_cross_cutting() {
        let products = fetch(PerimeterLevel::Product);
        let tagged: Vec<&PerimeterItem> = products
            .iter()
            .filter(|product| product.is_linked_to(level, &item.id))
            .collect();
        return descendants
            .iter()
            .map(|&descendant| (descendant, distinct_count(&tagged, descendant)))
            .collect();
    }

    descendants
        .iter()
        .map(|&descendant| {
            let rows = fetch(descendant);
            let count = match level.filter_key() {
                Some(_) => rows
                    .iter()
                    .filter(|row| row.is_linked_to(level, &item.id))
                    .count(),
                None => rows.len(),
            };
            (descendant, count)
        })
        .collect()
}

/// Distinct nodes of `level` among `products`; for Product, distinct product ids.
fn distinct_count(products: &[&PerimeterItem], level: PerimeterLevel) -> usize {
    let ids: FxHashSet<&str> = if level == PerimeterLevel::Product {
        products.iter().map(|p| p.id.as_str()).collect()
    } else {
        products
            .iter()
            .filter_map(|p| p.link(level))
            .map(|node| node.id.as_str())
            .collect()
    };
    ids.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::level::{ALL_LEVELS, CROSS_CUTTING_LEVELS, HIERARCHY_CHAIN};

    fn unfiltered(catalog: &Catalog) -> impl FnMut(PerimeterLevel) -> Arc<Vec<PerimeterItem>> + '_ {
        move |level| Arc::new(catalog.rows(level).to_vec())
    }

    #[test]
    fn market_counts_match_tags() {
        let catalog = Catalog::default();
        for market in catalog.rows(PerimeterLevel::Market) {
            let counts = sub_level_counts(PerimeterLevel::Market, market, unfiltered(&catalog));
            let tag_count = |suffix: &str| {
                market
                    .tags
                    .iter()
                    .find_map(|t| t.strip_suffix(suffix))
                    .and_then(|n| n.trim().parse::<usize>().ok())
                    .unwrap()
            };
            assert_eq!(counts[&PerimeterLevel::DetailedMarket], tag_count(" MD"));
            assert_eq!(counts[&PerimeterLevel::Category], tag_count(" CAT"));
            assert_eq!(counts.len(), 6);
        }
    }

    #[test]
    fn every_level_reports_its_descendants() {
        let catalog = Catalog::default();
        for level in ALL_LEVELS {
            let item = &catalog.rows(level)[0];
            let counts = sub_level_counts(level, item, unfiltered(&catalog));
            let keys: Vec<PerimeterLevel> = counts.keys().copied().collect();
            assert_eq!(keys, level.descendant_levels().to_vec());
        }
    }

    #[test]
    fn sub_family_counts_its_products() {
        let catalog = Catalog::default();
        let sub_family = &catalog.rows(PerimeterLevel::SubFamily)[0];
        let counts = sub_level_counts(PerimeterLevel::SubFamily, sub_family, unfiltered(&catalog));
        assert_eq!(
            counts[&PerimeterLevel::Product],
            catalog.settings().products_per_sub_family()
        );
    }

    #[test]
    fn cross_cutting_counts_are_distinct() {
        let catalog = Catalog::default();
        for level in CROSS_CUTTING_LEVELS {
            for node in catalog.rows(level) {
                let counts = sub_level_counts(level, node, unfiltered(&catalog));
                assert_eq!(counts.len(), HIERARCHY_CHAIN.len());

                let tagged = catalog
                    .rows(PerimeterLevel::Product)
                    .iter()
                    .filter(|p| p.is_linked_to(level, &node.id))
                    .count();
                assert_eq!(counts[&PerimeterLevel::Product], tagged);

                // Distinct counts never grow going up the chain.
                for pair in HIERARCHY_CHAIN.windows(2) {
                    assert!(counts[&pair[0]] <= counts[&pair[1]]);
                }
            }
        }
    }

    #[test]
    fn product_has_no_sub_levels() {
        let catalog = Catalog::default();
        let product = &catalog.rows(PerimeterLevel::Product)[0];
        let mut calls = 0;
        let counts = sub_level_counts(PerimeterLevel::Product, product, |level| {
            calls += 1;
            Arc::new(catalog.rows(level).to_vec())
        });
        assert!(counts.is_empty());
        assert_eq!(calls, 0);
    }
}
