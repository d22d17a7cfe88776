//! Bill-of-materials resolution.
//!
//! A template prices one measured quantity: the top formula yields the
//! display quantity, then sub-items are evaluated strictly in declaration
//! order. Each sub-item sees the template variables, `qty`, and the results
//! of sub-items declared before it. A reference to a later sub-item reads as
//! 0; sub-items are never reordered.

use serde::{Deserialize, Serialize};

use super::context::Context;
use super::eval::evaluate_detailed;

/// A named template input such as "Wall Height".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub value: f64,
    /// Informational only.
    #[serde(default)]
    pub unit: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Variable {
            name: name.into(),
            value,
            unit: String::new(),
        }
    }
}

/// A dependent line item whose quantity comes from a formula.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubItemDefinition {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub quantity_formula: String,
}

impl SubItemDefinition {
    pub fn new(name: impl Into<String>, formula: impl Into<String>, unit_price: f64) -> Self {
        SubItemDefinition {
            name: name.into(),
            unit: String::new(),
            unit_price,
            quantity_formula: formula.into(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }
}

/// Everything needed to price one measured item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomInput {
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub variables: Vec<Variable>,
    pub measured_qty: f64,
    #[serde(default)]
    pub sub_items: Vec<SubItemDefinition>,
    #[serde(default)]
    pub unit_cost: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubItemResult {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
    pub total: f64,
    /// False when the formula produced no result and 0 was used.
    pub computed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomResult {
    pub display_quantity: f64,
    pub sub_items: Vec<SubItemResult>,
    pub item_total: f64,
    pub sub_items_total: f64,
    pub grand_total: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

impl BomInput {
    /// The context the top formula sees: variables plus `qty`.
    pub fn base_context(&self) -> Context {
        let mut ctx = Context::with_qty(self.measured_qty);
        for var in &self.variables {
            ctx.bind(var.name.as_str(), var.value);
        }
        ctx
    }
}

/// Price a measured item. Pure: identical inputs give identical results.
pub fn resolve_bom(input: &BomInput) -> BomResult {
    let base = input.base_context();

    let (display_quantity, unresolved) = match evaluate_detailed(&input.formula, &base) {
        Ok(evaluation) => (evaluation.value, evaluation.unresolved),
        Err(_) => (input.measured_qty, Vec::new()),
    };
    let item_total = display_quantity * input.unit_cost;

    let mut ctx = base;
    let mut sub_items = Vec::with_capacity(input.sub_items.len());
    for sub in &input.sub_items {
        let (quantity, computed, unresolved) = match evaluate_detailed(&sub.quantity_formula, &ctx) {
            Ok(evaluation) => (evaluation.value, true, evaluation.unresolved),
            Err(_) => (0.0, false, Vec::new()),
        };
        sub_items.push(SubItemResult {
            name: sub.name.clone(),
            quantity,
            unit: sub.unit.clone(),
            unit_price: sub.unit_price,
            total: quantity * sub.unit_price,
            computed,
            unresolved,
        });
        ctx.bind(sub.name.as_str(), quantity);
    }

    let sub_items_total = sub_items.iter().map(|s| s.total).sum::<f64>();

    BomResult {
        display_quantity,
        sub_items,
        item_total,
        sub_items_total,
        grand_total: item_total + sub_items_total,
        unresolved,
    }
}

/// [`resolve_bom`] taking its inputs separately.
pub fn resolve_bom_parts(
    formula: &str,
    variables: &[Variable],
    measured_qty: f64,
    sub_items: &[SubItemDefinition],
    unit_cost: f64,
) -> BomResult {
    resolve_bom(&BomInput {
        formula: formula.to_string(),
        variables: variables.to_vec(),
        measured_qty,
        sub_items: sub_items.to_vec(),
        unit_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> BomInput {
        BomInput {
            formula: "qty".to_string(),
            variables: vec![Variable::new("wall_height", 10.0)],
            measured_qty: 10.0,
            sub_items: vec![
                SubItemDefinition::new("Drywall Sheets", "roundup((qty*wall_height)/32)", 13.0)
                    .with_unit("ea"),
            ],
            unit_cost: 2.0,
        }
    }

    #[test]
    fn test_wall_scenario() {
        let result = resolve_bom(&wall());
        assert_eq!(result.display_quantity, 10.0);
        assert_eq!(result.item_total, 20.0);
        assert_eq!(result.sub_items.len(), 1);
        let sheets = &result.sub_items[0];
        assert_eq!(sheets.quantity, 4.0);
        assert_eq!(sheets.total, 52.0);
        assert_eq!(sheets.unit, "ea");
        assert!(sheets.computed);
        assert_eq!(result.sub_items_total, 52.0);
        assert_eq!(result.grand_total, 72.0);
    }

    #[test]
    fn test_forward_reference_is_zero() {
        let input = BomInput {
            measured_qty: 1.0,
            sub_items: vec![
                SubItemDefinition::new("A", "5", 1.0),
                SubItemDefinition::new("B", "[C]", 1.0),
                SubItemDefinition::new("C", "5", 1.0),
            ],
            ..Default::default()
        };
        let result = resolve_bom(&input);
        let quantities: Vec<f64> = result.sub_items.iter().map(|s| s.quantity).collect();
        assert_eq!(quantities, vec![5.0, 0.0, 5.0]);
        assert_eq!(result.sub_items[1].unresolved, vec!["C".to_string()]);
        assert!(result.sub_items[1].computed);
    }

    #[test]
    fn test_chained_sub_items_by_raw_and_normalized_name() {
        let input = BomInput {
            formula: "qty".to_string(),
            variables: vec![Variable::new("wall_height", 10.0), Variable::new("sides", 2.0)],
            measured_qty: 20.0,
            sub_items: vec![
                SubItemDefinition::new("Labor per SF", "(qty * [wall_height]) * [sides]", 1.25),
                SubItemDefinition::new("4x8 Drywall Sheets", "roundup([Labor_per_SF] / 32)", 13.0),
                SubItemDefinition::new("Screws (1000) Box", "roundup(([4x8_Drywall_Sheets] * 36) / 1000)", 25.0),
            ],
            unit_cost: 0.0,
        };
        let result = resolve_bom(&input);
        assert_eq!(result.sub_items[0].quantity, 400.0);
        assert_eq!(result.sub_items[1].quantity, 13.0);
        assert_eq!(result.sub_items[2].quantity, 1.0);
        assert_eq!(result.grand_total, 400.0 * 1.25 + 13.0 * 13.0 + 25.0);
    }

    #[test]
    fn test_top_formula_falls_back_to_measured() {
        let mut input = wall();
        input.formula = "qty *".to_string();
        assert_eq!(resolve_bom(&input).display_quantity, 10.0);
        input.formula = String::new();
        assert_eq!(resolve_bom(&input).display_quantity, 10.0);
        input.formula = "qty * 1.1".to_string();
        assert_eq!(resolve_bom(&input).display_quantity, 10.0 * 1.1);
    }

    #[test]
    fn test_sub_items_see_measured_not_display_quantity() {
        let mut input = wall();
        input.formula = "qty * 2".to_string();
        input.sub_items = vec![SubItemDefinition::new("Same", "qty", 1.0)];
        let result = resolve_bom(&input);
        assert_eq!(result.display_quantity, 20.0);
        assert_eq!(result.sub_items[0].quantity, 10.0);
    }

    #[test]
    fn test_failed_sub_item_is_zero_and_flagged() {
        let mut input = wall();
        input.sub_items = vec![
            SubItemDefinition::new("Broken", "roundup(", 5.0),
            SubItemDefinition::new("Uses Broken", "[Broken] + 1", 1.0),
        ];
        let result = resolve_bom(&input);
        assert_eq!(result.sub_items[0].quantity, 0.0);
        assert!(!result.sub_items[0].computed);
        assert_eq!(result.sub_items[0].total, 0.0);
        assert_eq!(result.sub_items[1].quantity, 1.0);
    }

    #[test]
    fn test_sub_item_named_qty_does_not_shadow_measured() {
        let mut input = wall();
        input.sub_items = vec![
            SubItemDefinition::new("qty", "999", 0.0),
            SubItemDefinition::new("After", "qty", 1.0),
        ];
        let result = resolve_bom(&input);
        assert_eq!(result.sub_items[1].quantity, 10.0);
    }

    #[test]
    fn test_later_sub_item_shadows_variable() {
        let mut input = wall();
        input.sub_items = vec![
            SubItemDefinition::new("wall_height", "3", 0.0),
            SubItemDefinition::new("Uses", "[wall_height]", 1.0),
        ];
        let result = resolve_bom(&input);
        assert_eq!(result.sub_items[1].quantity, 3.0);
    }

    #[test]
    fn test_idempotent() {
        let input = wall();
        let a = resolve_bom(&input);
        let b = resolve_bom(&input);
        assert_eq!(a, b);
        assert_eq!(a.grand_total.to_bits(), b.grand_total.to_bits());
    }

    #[test]
    fn test_resolve_bom_parts_matches() {
        let input = wall();
        let parts = resolve_bom_parts(
            &input.formula,
            &input.variables,
            input.measured_qty,
            &input.sub_items,
            input.unit_cost,
        );
        assert_eq!(parts, resolve_bom(&input));
    }
}
