//! FILENAME: tests/test_queries.rs
//! Integration tests for perimeter queries: filtering, calibration, determinism.

mod common;

use common::{assert_close, filters, TestHarness};
use perimeter_engine::{
    summarize, FilterKey, FilterSet, Perimeter, PerimeterLevel, RevenueRollup, ALL_LEVELS,
};

// ============================================================================
// STRUCTURAL FILTERING
// ============================================================================

#[test]
fn test_categories_of_pls_by_name() {
    let harness = TestHarness::new();
    let rows = harness
        .perimeter
        .get_perimetre_data_by_name("Catégorie", &filters(&[(FilterKey::Marche, "PLS")]));

    assert_eq!(rows.len(), 10);
    for row in &rows {
        assert_eq!(row.level, PerimeterLevel::Category);
        assert_eq!(row.link(PerimeterLevel::Market).unwrap().label, "PLS");
        let margins = row.raw_material_margin.numeric_value() + row.packaging_margin.numeric_value();
        assert!(margins <= 100.0, "{}: mpa+mpi = {}", row.label, margins);
    }
}

#[test]
fn test_filter_by_id_matches_filter_by_label() {
    let harness = TestHarness::new();
    let by_label = harness.query(
        PerimeterLevel::Family,
        &filters(&[(FilterKey::Categorie, "Yaourts")]),
    );
    let by_id = harness.query(
        PerimeterLevel::Family,
        &filters(&[(FilterKey::Categorie, "CAT-001")]),
    );
    assert!(!by_label.is_empty());
    assert_eq!(by_label, by_id);
}

#[test]
fn test_sentinel_returns_whole_level() {
    let harness = TestHarness::new();
    for level in ALL_LEVELS {
        let all = harness.query(level, &filters(&[(FilterKey::Marche, "all"), (FilterKey::Pays, "ALL")]));
        assert_eq!(all.as_slice(), harness.catalog_rows(level), "{}", level);
    }
}

#[test]
fn test_unlinked_filters_do_not_restrict() {
    let harness = TestHarness::new();
    // Category rows carry no family link: the famille filter is ignored.
    let rows = harness.query(
        PerimeterLevel::Category,
        &filters(&[(FilterKey::Famille, "Skyr")]),
    );
    assert_eq!(rows.len(), harness.catalog_rows(PerimeterLevel::Category).len());
}

#[test]
fn test_unknown_own_value_matches_nothing() {
    let harness = TestHarness::new();
    let rows = harness.query(
        PerimeterLevel::Category,
        &filters(&[(FilterKey::Categorie, "Rayon inconnu")]),
    );
    assert!(rows.is_empty());
}

#[test]
fn test_products_follow_cross_cutting_links() {
    let harness = TestHarness::new();
    let rows = harness.query(
        PerimeterLevel::Product,
        &filters(&[(FilterKey::Pays, "Italie"), (FilterKey::Marche, "DPH")]),
    );
    for row in &rows {
        assert_eq!(row.link(PerimeterLevel::Country).unwrap().label, "Italie");
        assert_eq!(row.link(PerimeterLevel::Market).unwrap().label, "DPH");
    }
    let expected = harness
        .catalog_rows(PerimeterLevel::Product)
        .iter()
        .filter(|p| {
            p.link(PerimeterLevel::Country).unwrap().label == "Italie"
                && p.link(PerimeterLevel::Market).unwrap().label == "DPH"
        })
        .count();
    assert_eq!(rows.len(), expected);
}

#[test]
fn test_structural_filtering_is_idempotent() {
    let harness = TestHarness::new();
    let filters = filters(&[(FilterKey::MarcheDetaille, "PLS Traiteur")]);
    let once = harness.query(PerimeterLevel::SubFamily, &filters);
    let again = perimeter_engine::structural_filter(&once, &filters, PerimeterLevel::SubFamily);
    assert_eq!(once, again);
}

// ============================================================================
// SCALAR CALIBRATION
// ============================================================================

#[test]
fn test_france_scales_revenue_and_keeps_labels() {
    let harness = TestHarness::new();
    let original = harness.catalog_rows(PerimeterLevel::Category);
    let adjusted = harness.query(
        PerimeterLevel::Category,
        &filters(&[(FilterKey::Pays, "France")]),
    );

    assert_eq!(adjusted.len(), original.len());
    for (before, after) in original.iter().zip(&adjusted) {
        assert_eq!(after.label, before.label);
        assert_eq!(after.tags, before.tags);
        assert_eq!(after.revenue.unit(), before.revenue.unit());
        assert_eq!(after.revenue.evolution, before.revenue.evolution);
        assert_close(
            after.revenue.numeric_value(),
            before.revenue.numeric_value() * 0.70,
            0.05 + 1e-9,
            &after.label,
        );
        assert_close(
            after.raw_material_margin.numeric_value(),
            (before.raw_material_margin.numeric_value() + 2.5).min(100.0),
            0.05 + 1e-9,
            "mpa",
        );
    }
}

#[test]
fn test_country_id_uses_country_calibration() {
    let harness = TestHarness::new();
    let by_label = harness.query(PerimeterLevel::Market, &filters(&[(FilterKey::Pays, "Espagne")]));
    let by_id = harness.query(PerimeterLevel::Market, &filters(&[(FilterKey::Pays, "CTY-03")]));
    assert_eq!(by_label, by_id);
}

#[test]
fn test_country_label_case_is_ignored_at_every_level() {
    let harness = TestHarness::new();
    for level in [PerimeterLevel::Category, PerimeterLevel::Product] {
        let canonical = harness.query(level, &filters(&[(FilterKey::Pays, "France")]));
        let lower = harness.query(level, &filters(&[(FilterKey::Pays, "france")]));
        assert!(!canonical.is_empty(), "{}", level);
        assert_eq!(lower, canonical, "{}", level);
    }
}

#[test]
fn test_supplier_and_portfolio_compose() {
    let harness = TestHarness::new();
    let original = harness.node(PerimeterLevel::Market, "PGC");
    let adjusted = harness.query(
        PerimeterLevel::Market,
        &filters(&[
            (FilterKey::Marche, "PGC"),
            (FilterKey::Fournisseur, "SUP-01"),
            (FilterKey::Portefeuille, "Epicerie"),
        ]),
    );
    assert_eq!(adjusted.len(), 1);
    assert_close(
        adjusted[0].revenue.in_euros(),
        original.revenue.in_euros() * 0.10 * 0.25,
        100_000.0,
        "revenue",
    );
    assert!(adjusted[0].opportunity.in_euros() >= 0.0);
}

// ============================================================================
// DETERMINISM
// ============================================================================

#[test]
fn test_queries_are_deterministic_across_engines() {
    let a = Perimeter::new();
    let b = Perimeter::new();
    let filters = filters(&[(FilterKey::Pays, "Allemagne"), (FilterKey::Marche, "PLS")]);

    for level in ALL_LEVELS {
        let left = serde_json::to_string(&a.get_perimetre_data(level, &filters)).unwrap();
        let right = serde_json::to_string(&b.get_perimetre_data(level, &filters)).unwrap();
        assert_eq!(left, right, "{}", level);
    }
}

#[test]
fn test_repeated_query_is_identical() {
    let harness = TestHarness::new();
    let filters = filters(&[(FilterKey::Fournisseur, "Laiterie du Val")]);
    let first = harness.query(PerimeterLevel::Product, &filters);
    let second = harness.query(PerimeterLevel::Product, &filters);
    assert_eq!(first, second);
}

// ============================================================================
// ROLLUP & SERIALIZATION
// ============================================================================

#[test]
fn test_bottom_up_products_sum_to_category() {
    let harness = TestHarness::new();
    assert_eq!(
        harness.perimeter.catalog().settings().rollup,
        RevenueRollup::BottomUp
    );

    let category = harness.node(PerimeterLevel::Category, "Fromages LS");
    let products = harness.query(
        PerimeterLevel::Product,
        &filters(&[(FilterKey::Categorie, "Fromages LS")]),
    );
    let totals = summarize(&products);

    assert!(totals.row_count > 0);
    assert_close(
        totals.revenue,
        category.revenue.in_euros(),
        category.revenue.in_euros() * 0.02,
        "category revenue",
    );
}

#[test]
fn test_row_json_uses_ui_field_names() {
    let harness = TestHarness::new();
    let product = &harness.catalog_rows(PerimeterLevel::Product)[0];
    let json = serde_json::to_value(product).unwrap();
    for field in ["id", "label", "ca", "mpa", "mpi", "evoPa", "theoreticalCost", "opportunity", "pv", "pvLeclerc", "ean"] {
        assert!(json.get(field).is_some(), "missing {}", field);
    }
    assert!(json["ca"]["value"].as_str().unwrap().ends_with('€'));

    let market = &harness.catalog_rows(PerimeterLevel::Market)[0];
    let json = serde_json::to_value(market).unwrap();
    assert!(json.get("pv").is_none());
    assert!(json.get("ean").is_none());
}

#[test]
fn test_filter_set_from_ui_json() {
    let harness = TestHarness::new();
    let filters: FilterSet = serde_json::from_str(r#"{"marche":"PLS","pays":"all"}"#).unwrap();
    let rows = harness.query(PerimeterLevel::DetailedMarket, &filters);
    assert_eq!(rows.len(), 2);
}
