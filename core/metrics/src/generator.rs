//! FILENAME: core/metrics/src/generator.rs
//! Metric Generator - deterministic synthetic financial figures.
//!
//! Every figure is a pure function of `(base_revenue, seed, category)`. The
//! pseudo-random source is a trigonometric hash (`fract(sin(seed) * 10000)`)
//! salted with a different multiplier per field, so one seed always yields
//! the same tuple and no seed can make generation fail.
//!
//! Derivation chain:
//! 1. Revenue = base revenue perturbed by a seeded ±5-15% variation
//! 2. MPA / MPI / Other drawn inside the category's margin band, then
//!    normalized so the three shares sum to 100
//! 3. Purchase cost = revenue / 1.6
//! 4. Theoretical cost = purchase cost with a seeded ±5% jitter
//! 5. Opportunity = max(0, purchase cost - theoretical cost)
//!
//! Evolutions are drawn independently per field and are not reconciled with
//! the values they annotate.

use serde::{Deserialize, Serialize};

use crate::metric::Metric;

/// Revenue divided by this ratio gives the purchase cost.
pub const PURCHASE_COST_RATIO: f64 = 1.6;

/// Half-width of the theoretical-cost jitter around the purchase cost.
pub const THEORETICAL_COST_JITTER: f64 = 0.05;

const POSITIVE_EVOLUTION_PROBABILITY: f64 = 0.7;

const SALT_VARIATION: f64 = 1.37;
const SALT_DIRECTION: f64 = 2.11;
const SALT_MPA: f64 = 3.73;
const SALT_MPI: f64 = 4.19;
const SALT_OTHER: f64 = 5.87;
const SALT_JITTER: f64 = 6.29;
const SALT_EVOLUTIONS: [f64; 6] = [7.13, 8.41, 9.67, 10.93, 11.59, 12.77];
const SALT_PRICE: f64 = 13.31;
const SALT_COMPETITOR: f64 = 14.53;
const SALT_PRICE_EVOLUTION: f64 = 15.07;
const SALT_COMPETITOR_EVOLUTION: f64 = 16.21;
const SALT_EAN: f64 = 17.89;

// ============================================================================
// SEEDED DRAWS
// ============================================================================

/// Maps any seed to `[0, 1)`. Non-finite seeds map to 0.
pub fn seeded_unit(seed: f64) -> f64 {
    let x = seed.sin() * 10_000.0;
    let fraction = x - x.floor();
    if fraction.is_finite() && fraction < 1.0 {
        fraction
    } else {
        0.0
    }
}

/// A `[0, 1)` draw for one field of one seed.
pub fn seeded_draw(seed: f64, salt: f64) -> f64 {
    seeded_unit(seed * salt + salt)
}

/// A draw in `[low, high)`.
pub fn seeded_between(seed: f64, salt: f64, low: f64, high: f64) -> f64 {
    low + seeded_draw(seed, salt) * (high - low)
}

/// Picks an index in `0..len`. Returns 0 for an empty range.
pub fn seeded_pick(seed: f64, salt: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    ((seeded_draw(seed, salt) * len as f64) as usize).min(len - 1)
}

/// Signed evolution: positive in [0.3, 3.0] 70% of the time, else negative in [0.1, 1.5].
pub fn seeded_evolution(seed: f64, salt: f64) -> f64 {
    if seeded_draw(seed, salt) < POSITIVE_EVOLUTION_PROBABILITY {
        seeded_between(seed, salt * 1.5, 0.3, 3.0)
    } else {
        -seeded_between(seed, salt * 1.5, 0.1, 1.5)
    }
}

// ============================================================================
// MARGIN PROFILES
// ============================================================================

/// Margin band steering the MPA / MPI split of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarginProfile {
    /// Raw material dominates the cost structure (dairy, deli, dry goods).
    RawMaterialHeavy,
    /// Packaging weighs as much as the content (liquids, hygiene, cleaning).
    PackagingHeavy,
    Balanced,
}

const RAW_MATERIAL_KEYWORDS: &[&str] = &[
    "fromage", "charcuterie", "beurre", "crème", "lait", "yaourt", "plats", "pâtes", "riz",
    "conserve", "confiserie", "biscuit", "céréale",
];

const PACKAGING_KEYWORDS: &[&str] = &[
    "eaux", "boisson", "cola", "lessive", "soin", "hygiène", "dentifrice", "nettoyant",
];

/// Draw ranges, in raw (pre-normalization) points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginBands {
    pub raw_material: (f64, f64),
    pub packaging: (f64, f64),
    pub other: (f64, f64),
}

impl MarginProfile {
    pub fn from_category(category: &str) -> Self {
        let category = category.to_lowercase();
        if RAW_MATERIAL_KEYWORDS.iter().any(|k| category.contains(k)) {
            MarginProfile::RawMaterialHeavy
        } else if PACKAGING_KEYWORDS.iter().any(|k| category.contains(k)) {
            MarginProfile::PackagingHeavy
        } else {
            MarginProfile::Balanced
        }
    }

    pub fn bands(&self) -> MarginBands {
        match self {
            MarginProfile::RawMaterialHeavy => MarginBands {
                raw_material: (45.0, 65.0),
                packaging: (5.0, 12.0),
                other: (15.0, 30.0),
            },
            MarginProfile::PackagingHeavy => MarginBands {
                raw_material: (15.0, 30.0),
                packaging: (20.0, 35.0),
                other: (20.0, 35.0),
            },
            MarginProfile::Balanced => MarginBands {
                raw_material: (30.0, 45.0),
                packaging: (10.0, 20.0),
                other: (20.0, 35.0),
            },
        }
    }
}

// ============================================================================
// FIGURES
// ============================================================================

/// One evolution percentage per generated field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Evolutions {
    pub revenue: f64,
    pub raw_material_margin: f64,
    pub packaging_margin: f64,
    pub purchase_cost: f64,
    pub theoretical_cost: f64,
    /// Always <= 0.
    pub opportunity: f64,
}

/// Numeric output of the generator, before formatting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeneratedFigures {
    /// Revenue in euros.
    pub revenue: f64,
    pub raw_material_margin_pct: f64,
    pub packaging_margin_pct: f64,
    pub other_pct: f64,
    pub purchase_cost: f64,
    pub theoretical_cost: f64,
    pub opportunity: f64,
    pub evolutions: Evolutions,
}

/// The formatted metric set of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoherentMetrics {
    pub ca: Metric,
    pub mpa: Metric,
    pub mpi: Metric,
    pub evo_pa: Metric,
    pub theoretical_cost: Metric,
    pub opportunity: Metric,
}

impl GeneratedFigures {
    pub fn to_metrics(&self) -> CoherentMetrics {
        let evo = &self.evolutions;
        CoherentMetrics {
            ca: Metric::amount(self.revenue, evo.revenue),
            mpa: Metric::percent(self.raw_material_margin_pct, evo.raw_material_margin),
            mpi: Metric::percent(self.packaging_margin_pct, evo.packaging_margin),
            evo_pa: Metric::amount(self.purchase_cost, evo.purchase_cost),
            theoretical_cost: Metric::amount(self.theoretical_cost, evo.theoretical_cost),
            opportunity: Metric::amount(self.opportunity, evo.opportunity.min(0.0)),
        }
    }
}

/// Generates the numeric figures of one node.
pub fn generate_figures(base_revenue: f64, seed: f64, category: &str) -> GeneratedFigures {
    let base = if base_revenue.is_finite() && base_revenue > 0.0 {
        base_revenue
    } else {
        0.0
    };

    let variation = seeded_between(seed, SALT_VARIATION, 0.05, 0.15);
    let direction = if seeded_draw(seed, SALT_DIRECTION) < 0.5 { -1.0 } else { 1.0 };
    let revenue = base * (1.0 + direction * variation);

    let bands = MarginProfile::from_category(category).bands();
    let raw_mpa = seeded_between(seed, SALT_MPA, bands.raw_material.0, bands.raw_material.1);
    let raw_mpi = seeded_between(seed, SALT_MPI, bands.packaging.0, bands.packaging.1);
    let raw_other = seeded_between(seed, SALT_OTHER, bands.other.0, bands.other.1);

    // Normalize the three-way split to 100.
    let total = raw_mpa + raw_mpi + raw_other;
    let raw_material_margin_pct = raw_mpa / total * 100.0;
    let packaging_margin_pct = raw_mpi / total * 100.0;
    let other_pct = 100.0 - raw_material_margin_pct - packaging_margin_pct;

    let purchase_cost = revenue / PURCHASE_COST_RATIO;
    let jitter = seeded_between(
        seed,
        SALT_JITTER,
        -THEORETICAL_COST_JITTER,
        THEORETICAL_COST_JITTER,
    );
    let theoretical_cost = purchase_cost * (1.0 + jitter);
    let opportunity = (purchase_cost - theoretical_cost).max(0.0);

    let evolutions = Evolutions {
        revenue: seeded_evolution(seed, SALT_EVOLUTIONS[0]),
        raw_material_margin: seeded_evolution(seed, SALT_EVOLUTIONS[1]),
        packaging_margin: seeded_evolution(seed, SALT_EVOLUTIONS[2]),
        purchase_cost: seeded_evolution(seed, SALT_EVOLUTIONS[3]),
        theoretical_cost: seeded_evolution(seed, SALT_EVOLUTIONS[4]),
        opportunity: -seeded_between(seed, SALT_EVOLUTIONS[5], 0.1, 1.5),
    };

    GeneratedFigures {
        revenue,
        raw_material_margin_pct,
        packaging_margin_pct,
        other_pct,
        purchase_cost,
        theoretical_cost,
        opportunity,
        evolutions,
    }
}

/// Generates the formatted metric set of one node.
pub fn generate_coherent_metrics(base_revenue: f64, seed: f64, category: &str) -> CoherentMetrics {
    generate_figures(base_revenue, seed, category).to_metrics()
}

// ============================================================================
// PRODUCT PRICING
// ============================================================================

/// Shelf-level figures only products carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPricing {
    pub sell_price: f64,
    pub sell_price_competitor: f64,
    pub price_evolution: f64,
    pub competitor_evolution: f64,
    pub ean: String,
    pub margin_vs_sell_price: Option<f64>,
    pub margin_vs_competitor: Option<f64>,
}

pub fn generate_product_pricing(seed: f64, figures: &GeneratedFigures) -> ProductPricing {
    let sell_price = seeded_between(seed, SALT_PRICE, 0.80, 9.80);
    let sell_price_competitor = sell_price * seeded_between(seed, SALT_COMPETITOR, 0.92, 1.08);

    ProductPricing {
        sell_price,
        sell_price_competitor,
        price_evolution: seeded_evolution(seed, SALT_PRICE_EVOLUTION),
        competitor_evolution: seeded_evolution(seed, SALT_COMPETITOR_EVOLUTION),
        ean: ean13(seed),
        margin_vs_sell_price: margin_vs_sell_price(figures.revenue, figures.theoretical_cost),
        margin_vs_competitor: margin_vs_competitor(
            sell_price,
            sell_price_competitor,
            figures.revenue,
            figures.theoretical_cost,
        ),
    }
}

/// Margin left on the shelf price once the theoretical cost is paid, in percent.
/// `None` when revenue is zero.
pub fn margin_vs_sell_price(revenue: f64, theoretical_cost: f64) -> Option<f64> {
    if !revenue.is_finite() || revenue <= 0.0 {
        return None;
    }
    Some((1.0 - theoretical_cost / revenue) * 100.0)
}

/// Margin the competitor's shelf price would leave on our unit cost, in percent.
/// `None` when revenue or the competitor price is zero.
pub fn margin_vs_competitor(
    sell_price: f64,
    competitor_price: f64,
    revenue: f64,
    theoretical_cost: f64,
) -> Option<f64> {
    if !revenue.is_finite() || revenue <= 0.0 || !competitor_price.is_finite() || competitor_price <= 0.0 {
        return None;
    }
    let unit_cost = sell_price * theoretical_cost / revenue;
    Some((competitor_price - unit_cost) / competitor_price * 100.0)
}

/// A French-prefixed EAN-13 (leading `3`) with a valid GS1 check digit.
pub fn ean13(seed: f64) -> String {
    let mut digits = [0u8; 13];
    digits[0] = 3;
    for (i, digit) in digits.iter_mut().enumerate().take(12).skip(1) {
        *digit = (seeded_draw(seed, SALT_EAN + i as f64) * 10.0).floor().min(9.0) as u8;
    }
    digits[12] = ean_check_digit(&digits[..12]);
    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

/// GS1 check digit over the first 12 digits (weights 1, 3, 1, 3, ...).
pub fn ean_check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| d as u32 * if i % 2 == 0 { 1 } else { 3 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

pub fn is_valid_ean13(code: &str) -> bool {
    if code.len() != 13 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u8> = code.bytes().map(|b| b - b'0').collect();
    ean_check_digit(&digits[..12]) == digits[12]
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATEGORIES: [&str; 3] = ["Fromages LS", "Eaux", "Snacking"];

    #[test]
    fn same_inputs_give_identical_output() {
        for seed in [0.0, 1.0, 42.0, 1234.5, -7.0] {
            let first = generate_coherent_metrics(5_000_000.0, seed, "Yaourts");
            let second = generate_coherent_metrics(5_000_000.0, seed, "Yaourts");
            assert_eq!(first, second);
            assert_eq!(
                generate_figures(5_000_000.0, seed, "Yaourts"),
                generate_figures(5_000_000.0, seed, "Yaourts")
            );
        }
    }

    #[test]
    fn figures_respect_invariants() {
        for category in CATEGORIES {
            for i in 0..500 {
                let seed = i as f64 * 3.1 + 0.5;
                let f = generate_figures(2_000_000.0, seed, category);

                let sum = f.raw_material_margin_pct + f.packaging_margin_pct + f.other_pct;
                assert!((sum - 100.0).abs() < 1e-9, "split sums to {}", sum);
                assert!(f.raw_material_margin_pct + f.packaging_margin_pct <= 100.0);
                assert!(f.other_pct >= 0.0);

                assert!(f.revenue >= 2_000_000.0 * 0.85 - 1e-6);
                assert!(f.revenue <= 2_000_000.0 * 1.15 + 1e-6);
                assert!((f.purchase_cost - f.revenue / PURCHASE_COST_RATIO).abs() < 1e-6);
                assert!((f.theoretical_cost / f.purchase_cost - 1.0).abs() <= THEORETICAL_COST_JITTER + 1e-9);

                assert!(f.opportunity >= 0.0);
                assert!((f.opportunity - (f.purchase_cost - f.theoretical_cost).max(0.0)).abs() < 1e-9);
                assert!(f.evolutions.opportunity < 0.0);
            }
        }
    }

    #[test]
    fn evolutions_stay_in_their_ranges() {
        for i in 0..300 {
            let evo = seeded_evolution(i as f64, 7.13);
            assert!(
                (0.3..=3.0).contains(&evo) || (-1.5..=-0.1).contains(&evo),
                "evolution {} out of range",
                evo
            );
        }
    }

    #[test]
    fn category_steers_margin_band() {
        assert_eq!(MarginProfile::from_category("Fromages LS"), MarginProfile::RawMaterialHeavy);
        assert_eq!(MarginProfile::from_category("Boissons gazeuses"), MarginProfile::PackagingHeavy);
        assert_eq!(MarginProfile::from_category("Snacking"), MarginProfile::Balanced);

        for i in 0..100 {
            let seed = i as f64;
            let raw = generate_figures(1_000_000.0, seed, "Fromages LS");
            let packaging = generate_figures(1_000_000.0, seed, "Eaux");
            assert!(raw.raw_material_margin_pct > packaging.raw_material_margin_pct);
        }
    }

    #[test]
    fn invalid_base_revenue_generates_zeros() {
        let f = generate_figures(f64::NAN, 3.0, "Eaux");
        assert_eq!(f.revenue, 0.0);
        assert_eq!(f.opportunity, 0.0);
        let f = generate_figures(-10.0, 3.0, "Eaux");
        assert_eq!(f.purchase_cost, 0.0);
    }

    #[test]
    fn seeded_unit_is_bounded() {
        for seed in [0.0, 1e-12, 1e300, -1e300, f64::NAN, f64::INFINITY] {
            let u = seeded_unit(seed);
            assert!((0.0..1.0).contains(&u));
        }
        assert_eq!(seeded_pick(12.0, 1.0, 0), 0);
        assert!(seeded_pick(12.0, 1.0, 5) < 5);
    }

    #[test]
    fn ean_codes_are_valid() {
        assert!(is_valid_ean13("4006381333931"));
        assert!(!is_valid_ean13("4006381333932"));
        assert!(!is_valid_ean13("40063813339"));
        for i in 0..50 {
            let code = ean13(i as f64 * 1.7);
            assert_eq!(code.len(), 13);
            assert!(code.starts_with('3'));
            assert!(is_valid_ean13(&code), "{} has a bad check digit", code);
        }
    }

    #[test]
    fn margins_guard_against_zero_denominators() {
        assert_eq!(margin_vs_sell_price(0.0, 10.0), None);
        assert_eq!(margin_vs_competitor(2.0, 0.0, 100.0, 60.0), None);
        assert_eq!(margin_vs_competitor(2.0, 2.1, 0.0, 60.0), None);

        let margin = margin_vs_sell_price(100.0, 60.0).unwrap();
        assert!((margin - 40.0).abs() < 1e-9);
    }

    #[test]
    fn product_pricing_is_deterministic() {
        let figures = generate_figures(800_000.0, 9.0, "Biscuits");
        let a = generate_product_pricing(9.0, &figures);
        let b = generate_product_pricing(9.0, &figures);
        assert_eq!(a, b);
        assert!((0.80..9.80).contains(&a.sell_price));
        let ratio = a.sell_price_competitor / a.sell_price;
        assert!((0.92..=1.08).contains(&ratio));
        assert!(a.margin_vs_sell_price.is_some());
    }
}
