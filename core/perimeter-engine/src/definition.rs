//! FILENAME: core/perimeter-engine/src/definition.rs
//! Perimeter Definition - the row and filter types exchanged with callers.
//!
//! These structures are designed to be:
//! - Serializable (sent to the UI as JSON)
//! - Immutable snapshots (rows are never written back into the catalog)
//! - Joined by stable ids, with labels kept for display

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use metrics::Metric;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::level::{FilterKey, PerimeterLevel};
use crate::log_warn;

/// Filter value meaning "no restriction on this dimension".
pub const ALL: &str = "all";

/// True for the sentinel (any case) and for blank values.
pub fn is_sentinel(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(ALL)
}

// ============================================================================
// NODE REFERENCES
// ============================================================================

/// Reference to a node of another level: stable id plus display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: String,
    pub label: String,
}

impl NodeRef {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        NodeRef {
            id: id.into(),
            label: label.into(),
        }
    }

    /// A filter value selects this node by id or by label.
    pub fn matches(&self, value: &str) -> bool {
        self.id == value || self.label == value
    }
}

/// Links from a row to the nodes above it (chain ancestors) and, for
/// products, to their supplier / portfolio / country.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ancestry(SmallVec<[(PerimeterLevel, NodeRef); 6]>);

impl Ancestry {
    pub fn new() -> Self {
        Ancestry(SmallVec::new())
    }

    /// Adds or replaces the link for `level`.
    pub fn set(&mut self, level: PerimeterLevel, node: NodeRef) {
        match self.0.iter_mut().find(|(l, _)| *l == level) {
            Some(entry) => entry.1 = node,
            None => self.0.push((level, node)),
        }
    }

    pub fn with(mut self, level: PerimeterLevel, node: NodeRef) -> Self {
        self.set(level, node);
        self
    }

    pub fn get(&self, level: PerimeterLevel) -> Option<&NodeRef> {
        self.0.iter().find(|(l, _)| *l == level).map(|(_, node)| node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PerimeterLevel, &NodeRef)> {
        self.0.iter().map(|(l, node)| (*l, node))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// ROWS
// ============================================================================

/// Shelf-level fields only products carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    #[serde(rename = "pv")]
    pub sell_price: Metric,
    #[serde(rename = "pvLeclerc")]
    pub sell_price_competitor: Metric,
    /// 13-digit EAN code.
    pub ean: String,
    pub margin_vs_sell_price: Option<Metric>,
    pub margin_vs_competitor: Option<Metric>,
}

/// One row at one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerimeterItem {
    /// Stable, unique per level.
    pub id: String,
    pub level: PerimeterLevel,
    /// Display name.
    pub label: String,
    /// Free-text descriptions, never used in computation.
    pub tags: Vec<String>,
    #[serde(rename = "ca")]
    pub revenue: Metric,
    #[serde(rename = "mpa")]
    pub raw_material_margin: Metric,
    #[serde(rename = "mpi")]
    pub packaging_margin: Metric,
    #[serde(rename = "evoPa")]
    pub purchase_cost: Metric,
    pub theoretical_cost: Metric,
    pub opportunity: Metric,
    #[serde(flatten)]
    pub product: Option<ProductDetails>,
    pub ancestors: Ancestry,
}

impl PerimeterItem {
    pub fn node_ref(&self) -> NodeRef {
        NodeRef::new(self.id.clone(), self.label.clone())
    }

    /// The linked node at `level`, if this row carries one.
    pub fn link(&self, level: PerimeterLevel) -> Option<&NodeRef> {
        self.ancestors.get(level)
    }

    /// True when this row's link at `level` is the node `id`.
    pub fn is_linked_to(&self, level: PerimeterLevel, id: &str) -> bool {
        self.link(level).map_or(false, |node| node.id == id)
    }
}

// ============================================================================
// FILTERS
// ============================================================================

/// Active dimension filters, as the UI sends them.
///
/// Backed by a sorted map so two sets with the same entries compare, hash and
/// serialize identically whatever the insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    entries: BTreeMap<FilterKey, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        FilterSet::default()
    }

    pub fn with(mut self, key: FilterKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        self.entries.insert(key, value.into());
    }

    pub fn remove(&mut self, key: FilterKey) -> Option<String> {
        self.entries.remove(&key)
    }

    /// Raw value, sentinel included.
    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    /// Value when the filter restricts its dimension.
    pub fn active(&self, key: FilterKey) -> Option<&str> {
        self.get(key).filter(|value| !is_sentinel(value)).map(str::trim)
    }

    /// Restricting entries, in key order.
    pub fn iter_active(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        self.entries
            .iter()
            .filter(|(_, value)| !is_sentinel(value))
            .map(|(key, value)| (*key, value.trim()))
    }

    pub fn active_count(&self) -> usize {
        self.iter_active().count()
    }

    /// True when nothing restricts any dimension.
    pub fn is_unrestricted(&self) -> bool {
        self.active_count() == 0
    }

    /// Same restrictions with sentinel entries dropped and values trimmed.
    pub fn canonical(&self) -> FilterSet {
        FilterSet {
            entries: self
                .iter_active()
                .map(|(key, value)| (key, value.to_string()))
                .collect(),
        }
    }

    /// Order-independent hash of the canonical form.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.canonical().hash(&mut hasher);
        hasher.finish()
    }

    /// Builds a set from string pairs. Unknown keys are logged and skipped.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filters = FilterSet::new();
        for (key, value) in pairs {
            match key.parse::<FilterKey>() {
                Ok(key) => filters.set(key, value),
                Err(e) => log_warn!("REGISTRY", "ignoring filter: {}", e),
            }
        }
        filters
    }
}

/// Active filters resolved against the catalog: each value is the node it selects.
///
/// A value matching no node is kept as a node whose id and label are the raw
/// value, so it still restricts (and matches nothing).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFilters {
    entries: BTreeMap<FilterKey, NodeRef>,
}

impl ResolvedFilters {
    pub fn new() -> Self {
        ResolvedFilters::default()
    }

    pub fn insert(&mut self, key: FilterKey, node: NodeRef) {
        self.entries.insert(key, node);
    }

    pub fn get(&self, key: FilterKey) -> Option<&NodeRef> {
        self.entries.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &NodeRef)> {
        self.entries.iter().map(|(key, node)| (*key, node))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id-based filter set, used as the cache key: "PLS" and "MKT-01" resolve
    /// to the same entry.
    pub fn to_filter_set(&self) -> FilterSet {
        let mut filters = FilterSet::new();
        for (key, node) in &self.entries {
            filters.set(*key, node.id.clone());
        }
        filters
    }

    /// Label-based filter set, as the calibration table is keyed by label.
    pub fn to_label_set(&self) -> FilterSet {
        let mut filters = FilterSet::new();
        for (key, node) in &self.entries {
            filters.set(*key, node.label.clone());
        }
        filters
    }
}

// ============================================================================
// COLUMNS
// ============================================================================

/// Display type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Text,
    Amount,
    Percent,
    Price,
    Code,
}

/// A display-only column of a level's table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Field name in the serialized row.
    pub key: &'static str,
    pub header: &'static str,
    pub kind: ColumnKind,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, kind: ColumnKind) -> Self {
        ColumnDef { key, header, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_ignores_order_and_sentinels() {
        let a = FilterSet::new()
            .with(FilterKey::Pays, "France")
            .with(FilterKey::Marche, "PLS")
            .with(FilterKey::Famille, ALL);
        let b = FilterSet::new()
            .with(FilterKey::Marche, " PLS ")
            .with(FilterKey::Pays, "France");

        assert_eq!(a.canonical(), b.canonical());
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), FilterSet::new().fingerprint());
    }

    #[test]
    fn sentinel_is_not_active() {
        let filters = FilterSet::new()
            .with(FilterKey::Marche, "ALL")
            .with(FilterKey::Categorie, "  ");
        assert!(filters.is_unrestricted());
        assert_eq!(filters.active(FilterKey::Marche), None);
        assert_eq!(filters.get(FilterKey::Marche), Some("ALL"));
    }

    #[test]
    fn from_pairs_skips_unknown_keys() {
        let filters = FilterSet::from_pairs([("marche", "PLS"), ("rayon", "X"), ("pays", "France")]);
        assert_eq!(filters.active_count(), 2);
        assert_eq!(filters.active(FilterKey::Pays), Some("France"));
    }

    #[test]
    fn filter_set_json_uses_ui_keys() {
        let filters = FilterSet::new()
            .with(FilterKey::SousFamille, "Skyr nature")
            .with(FilterKey::Marche, "PLS");
        let json = serde_json::to_string(&filters).unwrap();
        assert_eq!(json, r#"{"marche":"PLS","sousFamille":"Skyr nature"}"#);

        let back: FilterSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, filters);
        assert!(serde_json::from_str::<FilterSet>(r#"{"rayon":"X"}"#).is_err());
    }

    #[test]
    fn ancestry_replaces_existing_links() {
        let mut ancestry = Ancestry::new()
            .with(PerimeterLevel::Market, NodeRef::new("MKT-01", "PLS"));
        ancestry.set(PerimeterLevel::Market, NodeRef::new("MKT-02", "PGC"));
        assert_eq!(ancestry.len(), 1);
        assert_eq!(ancestry.get(PerimeterLevel::Market).unwrap().label, "PGC");
        assert!(ancestry.get(PerimeterLevel::Country).is_none());
    }

    #[test]
    fn node_matches_id_or_label() {
        let node = NodeRef::new("CTY-01", "France");
        assert!(node.matches("CTY-01"));
        assert!(node.matches("France"));
        assert!(!node.matches("france"));
    }

    #[test]
    fn resolved_filters_key_by_id() {
        let mut resolved = ResolvedFilters::new();
        resolved.insert(FilterKey::Marche, NodeRef::new("MKT-01", "PLS"));
        assert_eq!(resolved.to_filter_set().get(FilterKey::Marche), Some("MKT-01"));
        assert_eq!(resolved.to_label_set().get(FilterKey::Marche), Some("PLS"));
    }
}
