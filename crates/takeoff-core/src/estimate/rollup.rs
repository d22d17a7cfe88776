//! Rolling markups up into priced estimate lines.

use serde::Serialize;
use std::collections::BTreeMap;

use takeoff_engine::engine::{BomInput, BomResult, SubItemResult, format_quantity, resolve_bom};

use super::cache::BomCache;
use super::markup::{Markup, MarkupKind, Project};

pub const UNGROUPED: &str = "Ungrouped";

/// One priced markup.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MarkupKind,
    pub group: String,
    pub color: String,
    /// Display quantity from the item formula.
    pub quantity: f64,
    pub unit: String,
    pub quantity_display: String,
    pub unit_price: f64,
    pub item_total: f64,
    pub sub_items_total: f64,
    pub grand_total: f64,
    pub sub_items: Vec<SubItemResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

impl EstimateItem {
    pub fn has_sub_items(&self) -> bool {
        !self.sub_items.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotal {
    pub items: usize,
    pub grand_total: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateTotals {
    pub items: usize,
    pub grand_total: f64,
    pub groups: BTreeMap<String, GroupTotal>,
}

impl EstimateTotals {
    pub fn from_items(items: &[EstimateItem]) -> Self {
        let mut totals = EstimateTotals::default();
        for item in items {
            totals.items += 1;
            totals.grand_total += item.grand_total;
            let group = totals.groups.entry(item.group.clone()).or_default();
            group.items += 1;
            group.grand_total += item.grand_total;
        }
        totals
    }
}

fn price_markup(
    markup: &Markup,
    pixels_per_foot: f64,
    resolve: &impl Fn(&BomInput) -> BomResult,
) -> Option<EstimateItem> {
    markup.kind.measure_kind()?;
    let qty = markup.base_quantity(pixels_per_foot).unwrap_or(0.0);
    let props = &markup.properties;

    let result = resolve(&BomInput {
        formula: props.formula.clone(),
        variables: props.variables.clone(),
        measured_qty: qty,
        sub_items: props.sub_items.clone(),
        unit_cost: props.unit_cost,
    });

    let quantity = result.display_quantity;
    let unit = markup.display_unit().to_string();
    let unit_price = if props.unit_cost != 0.0 {
        props.unit_cost
    } else if result.grand_total > 0.0 && quantity > 0.0 {
        result.grand_total / quantity
    } else {
        0.0
    };
    let non_empty = |s: &str, fallback: &str| {
        if s.trim().is_empty() {
            fallback.to_string()
        } else {
            s.to_string()
        }
    };

    Some(EstimateItem {
        id: markup.id.clone(),
        name: non_empty(&props.name, markup.kind.as_str()),
        kind: markup.kind,
        group: non_empty(&props.group, UNGROUPED),
        color: non_empty(&props.color, "#000"),
        quantity,
        quantity_display: format_quantity(quantity, &unit),
        unit,
        unit_price,
        item_total: result.item_total,
        sub_items_total: result.sub_items_total,
        grand_total: result.grand_total,
        sub_items: result.sub_items,
        unresolved: result.unresolved,
    })
}

fn build_with(
    project: &Project,
    default_ppf: Option<f64>,
    resolve: impl Fn(&BomInput) -> BomResult,
) -> Vec<EstimateItem> {
    let items: Vec<EstimateItem> = project
        .markups
        .iter()
        .filter_map(|markup| {
            let ppf = project.pixels_per_foot(&markup.page_id, default_ppf);
            price_markup(markup, ppf, &resolve)
        })
        .collect();
    tracing::debug!(
        markups = project.markups.len(),
        items = items.len(),
        "built estimate"
    );
    items
}

/// Price every measurable markup, in project order. Annotations (notes,
/// drawings, highlights, legends, rulers) and selections are skipped.
pub fn build_estimate(project: &Project, default_ppf: Option<f64>) -> Vec<EstimateItem> {
    build_with(project, default_ppf, resolve_bom)
}

/// [`build_estimate`] sharing BOM results through `cache`.
pub fn build_estimate_cached(
    project: &Project,
    default_ppf: Option<f64>,
    cache: &BomCache,
) -> Vec<EstimateItem> {
    build_with(project, default_ppf, |input| cache.resolve(input))
}
