//! FILENAME: core/perimeter-engine/src/view.rs
//! Result view helpers: sorting and totals over query rows.
//!
//! Values are read back from the formatted metrics with the lenient parser,
//! so an unreadable value sorts and sums as 0.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::definition::PerimeterItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Label,
    Revenue,
    RawMaterialMargin,
    PackagingMargin,
    PurchaseCost,
    TheoreticalCost,
    Opportunity,
    /// Products only; other rows sort as 0.
    SellPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Amounts in euros whatever their display unit; percentages as shown.
fn sort_value(item: &PerimeterItem, column: SortColumn) -> f64 {
    match column {
        SortColumn::Label => 0.0,
        SortColumn::Revenue => item.revenue.in_euros(),
        SortColumn::RawMaterialMargin => item.raw_material_margin.numeric_value(),
        SortColumn::PackagingMargin => item.packaging_margin.numeric_value(),
        SortColumn::PurchaseCost => item.purchase_cost.in_euros(),
        SortColumn::TheoreticalCost => item.theoretical_cost.in_euros(),
        SortColumn::Opportunity => item.opportunity.in_euros(),
        SortColumn::SellPrice => item
            .product
            .as_ref()
            .map_or(0.0, |details| details.sell_price.in_euros()),
    }
}

/// Stable sort; ties keep their catalog order.
pub fn sort_rows(rows: &mut [PerimeterItem], column: SortColumn, order: SortOrder) {
    rows.sort_by(|a, b| {
        let ordering = match column {
            SortColumn::Label => a.label.cmp(&b.label),
            _ => sort_value(a, column).total_cmp(&sort_value(b, column)),
        };
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

/// Row count and amount totals of a result, in euros.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerimeterTotals {
    pub row_count: usize,
    pub revenue: f64,
    pub purchase_cost: f64,
    pub theoretical_cost: f64,
    pub opportunity: f64,
}

impl PerimeterTotals {
    /// Opportunity as a share of purchase cost, in percent. `None` without purchases.
    pub fn opportunity_rate(&self) -> Option<f64> {
        if self.purchase_cost > 0.0 {
            Some(self.opportunity / self.purchase_cost * 100.0)
        } else {
            None
        }
    }
}

pub fn summarize(rows: &[PerimeterItem]) -> PerimeterTotals {
    rows.iter().fold(PerimeterTotals::default(), |mut totals, item| {
        totals.row_count += 1;
        totals.revenue += item.revenue.in_euros();
        totals.purchase_cost += item.purchase_cost.in_euros();
        totals.theoretical_cost += item.theoretical_cost.in_euros();
        totals.opportunity += item.opportunity.in_euros();
        totals
    })
}

/// Index of the row with the largest value in `column`, first one on ties.
pub fn top_row(rows: &[PerimeterItem], column: SortColumn) -> Option<usize> {
    rows.iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| match column {
            SortColumn::Label => a.label.cmp(&b.label).then(ib.cmp(ia)),
            _ => sort_value(a, column)
                .total_cmp(&sort_value(b, column))
                .then(ib.cmp(ia)),
        })
        .map(|(index, _)| index)
}
