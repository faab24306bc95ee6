//! FILENAME: core/perimeter-engine/src/level.rs
//! Perimeter levels and filter keys.
//!
//! One closed enum covers the seven chained hierarchy levels and the three
//! cross-cutting dimensions. Every mapping (filter key, descendants, display
//! name) is a total `match`, so there is no string-typed special casing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PerimeterError;

// ============================================================================
// LEVELS
// ============================================================================

/// A tier of the business hierarchy or a cross-cutting dimension.
/// Declaration order is the drill-down order and drives `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PerimeterLevel {
    Market,
    DetailedMarket,
    Category,
    GroupFamily,
    Family,
    SubFamily,
    Product,
    Supplier,
    Portfolio,
    Country,
}

/// Every level, in declaration order.
pub const ALL_LEVELS: [PerimeterLevel; 10] = [
    PerimeterLevel::Market,
    PerimeterLevel::DetailedMarket,
    PerimeterLevel::Category,
    PerimeterLevel::GroupFamily,
    PerimeterLevel::Family,
    PerimeterLevel::SubFamily,
    PerimeterLevel::Product,
    PerimeterLevel::Supplier,
    PerimeterLevel::Portfolio,
    PerimeterLevel::Country,
];

/// The parent -> child chain, Market first.
pub static HIERARCHY_CHAIN: [PerimeterLevel; 7] = [
    PerimeterLevel::Market,
    PerimeterLevel::DetailedMarket,
    PerimeterLevel::Category,
    PerimeterLevel::GroupFamily,
    PerimeterLevel::Family,
    PerimeterLevel::SubFamily,
    PerimeterLevel::Product,
];

/// Dimensions tagged on every product, outside the chain.
pub const CROSS_CUTTING_LEVELS: [PerimeterLevel; 3] = [
    PerimeterLevel::Supplier,
    PerimeterLevel::Portfolio,
    PerimeterLevel::Country,
];

impl PerimeterLevel {
    /// Dense index in `0..ALL_LEVELS.len()`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PerimeterLevel::Market => "Marché",
            PerimeterLevel::DetailedMarket => "Marché Détaillé",
            PerimeterLevel::Category => "Catégorie",
            PerimeterLevel::GroupFamily => "Groupe Famille",
            PerimeterLevel::Family => "Famille",
            PerimeterLevel::SubFamily => "Sous-Famille",
            PerimeterLevel::Product => "Produit",
            PerimeterLevel::Supplier => "Fournisseur",
            PerimeterLevel::Portfolio => "Portefeuille",
            PerimeterLevel::Country => "Pays",
        }
    }

    /// Prefix of the stable node ids at this level.
    pub fn id_prefix(self) -> &'static str {
        match self {
            PerimeterLevel::Market => "MKT",
            PerimeterLevel::DetailedMarket => "MD",
            PerimeterLevel::Category => "CAT",
            PerimeterLevel::GroupFamily => "GF",
            PerimeterLevel::Family => "FAM",
            PerimeterLevel::SubFamily => "SF",
            PerimeterLevel::Product => "PRD",
            PerimeterLevel::Supplier => "SUP",
            PerimeterLevel::Portfolio => "PTF",
            PerimeterLevel::Country => "CTY",
        }
    }

    /// The filter key selecting a node of this level. Products have none.
    pub fn filter_key(self) -> Option<FilterKey> {
        match self {
            PerimeterLevel::Market => Some(FilterKey::Marche),
            PerimeterLevel::DetailedMarket => Some(FilterKey::MarcheDetaille),
            PerimeterLevel::Category => Some(FilterKey::Categorie),
            PerimeterLevel::GroupFamily => Some(FilterKey::GroupeFamille),
            PerimeterLevel::Family => Some(FilterKey::Famille),
            PerimeterLevel::SubFamily => Some(FilterKey::SousFamille),
            PerimeterLevel::Product => None,
            PerimeterLevel::Supplier => Some(FilterKey::Fournisseur),
            PerimeterLevel::Portfolio => Some(FilterKey::Portefeuille),
            PerimeterLevel::Country => Some(FilterKey::Pays),
        }
    }

    pub fn is_cross_cutting(self) -> bool {
        matches!(
            self,
            PerimeterLevel::Supplier | PerimeterLevel::Portfolio | PerimeterLevel::Country
        )
    }

    /// Levels whose rows can be counted under a node of this level.
    ///
    /// Chain levels map to the tail of the chain below them, Product is
    /// terminal, and cross-cutting levels map to the entire chain because a
    /// supplier, portfolio or country spans every tier.
    pub fn descendant_levels(self) -> &'static [PerimeterLevel] {
        match self {
            PerimeterLevel::Market => &HIERARCHY_CHAIN[1..],
            PerimeterLevel::DetailedMarket => &HIERARCHY_CHAIN[2..],
            PerimeterLevel::Category => &HIERARCHY_CHAIN[3..],
            PerimeterLevel::GroupFamily => &HIERARCHY_CHAIN[4..],
            PerimeterLevel::Family => &HIERARCHY_CHAIN[5..],
            PerimeterLevel::SubFamily => &HIERARCHY_CHAIN[6..],
            PerimeterLevel::Product => &[],
            PerimeterLevel::Supplier | PerimeterLevel::Portfolio | PerimeterLevel::Country => {
                &HIERARCHY_CHAIN
            }
        }
    }

    /// Chain levels above this one, Market first. Empty for cross-cutting levels.
    pub fn chain_ancestors(self) -> &'static [PerimeterLevel] {
        match HIERARCHY_CHAIN.iter().position(|&l| l == self) {
            Some(pos) => &HIERARCHY_CHAIN[..pos],
            None => &[],
        }
    }
}

impl fmt::Display for PerimeterLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PerimeterLevel {
    type Err = PerimeterError;

    /// Accepts the display name, the variant name, the filter key name, and
    /// the legacy "MarketDetail" alias, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        if wanted == "marketdetail" {
            return Ok(PerimeterLevel::DetailedMarket);
        }
        ALL_LEVELS
            .iter()
            .copied()
            .find(|level| {
                level.display_name().to_lowercase() == wanted
                    || format!("{:?}", level).to_lowercase() == wanted
                    || level
                        .filter_key()
                        .map_or(false, |key| key.name().to_lowercase() == wanted)
            })
            .ok_or_else(|| PerimeterError::UnknownLevel(s.to_string()))
    }
}

// ============================================================================
// FILTER KEYS
// ============================================================================

/// Key of a dimension filter. Serialized with the names the UI sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKey {
    Marche,
    MarcheDetaille,
    Categorie,
    GroupeFamille,
    Famille,
    SousFamille,
    Fournisseur,
    Portefeuille,
    Pays,
}

pub const ALL_FILTER_KEYS: [FilterKey; 9] = [
    FilterKey::Marche,
    FilterKey::MarcheDetaille,
    FilterKey::Categorie,
    FilterKey::GroupeFamille,
    FilterKey::Famille,
    FilterKey::SousFamille,
    FilterKey::Fournisseur,
    FilterKey::Portefeuille,
    FilterKey::Pays,
];

impl FilterKey {
    /// The level this key selects a node of. Inverse of `PerimeterLevel::filter_key`.
    pub fn level(self) -> PerimeterLevel {
        match self {
            FilterKey::Marche => PerimeterLevel::Market,
            FilterKey::MarcheDetaille => PerimeterLevel::DetailedMarket,
            FilterKey::Categorie => PerimeterLevel::Category,
            FilterKey::GroupeFamille => PerimeterLevel::GroupFamily,
            FilterKey::Famille => PerimeterLevel::Family,
            FilterKey::SousFamille => PerimeterLevel::SubFamily,
            FilterKey::Fournisseur => PerimeterLevel::Supplier,
            FilterKey::Portefeuille => PerimeterLevel::Portfolio,
            FilterKey::Pays => PerimeterLevel::Country,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterKey::Marche => "marche",
            FilterKey::MarcheDetaille => "marcheDetaille",
            FilterKey::Categorie => "categorie",
            FilterKey::GroupeFamille => "groupeFamille",
            FilterKey::Famille => "famille",
            FilterKey::SousFamille => "sousFamille",
            FilterKey::Fournisseur => "fournisseur",
            FilterKey::Portefeuille => "portefeuille",
            FilterKey::Pays => "pays",
        }
    }

    pub fn is_cross_cutting(self) -> bool {
        self.level().is_cross_cutting()
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKey {
    type Err = PerimeterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ALL_FILTER_KEYS
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| PerimeterError::UnknownFilterKey(s.to_string()))
    }
}
