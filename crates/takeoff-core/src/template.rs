//! Cost templates as stored in a template library.
//!
//! Two record shapes are accepted: a bare template (`{ id, toolType,
//! properties }`) and a seed-library row that wraps one under
//! `template_data` together with its display name and category.

use serde::{Deserialize, Serialize};

use takeoff_engine::engine::{
    BomInput, BomResult, SubItemDefinition, Variable, resolve_bom, to_base_quantity,
};

use crate::error::{Result, TakeoffError};
use crate::estimate::MarkupKind;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateProperties {
    pub name: String,
    pub unit: String,
    pub color: String,
    pub group: String,
    pub formula: String,
    pub sub_items: Vec<SubItemDefinition>,
    pub unit_cost: f64,
    /// Marks a cut-out shape. Carried so records round-trip; pricing ignores it.
    pub deduction: bool,
    pub variables: Vec<Variable>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub tool_type: MarkupKind,
    #[serde(default)]
    pub properties: TemplateProperties,
}

#[derive(Deserialize)]
pub(crate) struct TemplateData {
    #[serde(default)]
    id: String,
    #[serde(rename = "toolType")]
    tool_type: MarkupKind,
    #[serde(default)]
    properties: TemplateProperties,
}

#[derive(Deserialize)]
pub(crate) struct SeedRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    template_data: TemplateData,
}

/// One entry of a library file.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum TemplateRecord {
    Seed(SeedRecord),
    Plain(Template),
}

impl From<TemplateRecord> for Template {
    fn from(record: TemplateRecord) -> Self {
        match record {
            TemplateRecord::Plain(template) => template,
            TemplateRecord::Seed(seed) => Template {
                id: seed.template_data.id,
                name: seed.name,
                description: seed.description,
                category: seed.category,
                tool_type: seed.template_data.tool_type,
                properties: seed.template_data.properties,
            },
        }
    }
}

impl Template {
    /// Record name, or the item name when the record has none.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.properties.name
        } else {
            &self.name
        }
    }

    /// Pricing inputs for a quantity already expressed in the template's unit.
    pub fn to_bom_input(&self, measured_qty: f64) -> BomInput {
        let props = &self.properties;
        BomInput {
            formula: props.formula.clone(),
            variables: props.variables.clone(),
            measured_qty,
            sub_items: props.sub_items.clone(),
            unit_cost: props.unit_cost,
        }
    }

    /// Price a raw drawing value: pixels, square pixels or a count.
    pub fn price(&self, raw: f64, pixels_per_foot: f64) -> Result<BomResult> {
        let kind = self
            .tool_type
            .measure_kind()
            .ok_or_else(|| TakeoffError::NotMeasurable {
                name: self.display_name().to_string(),
                tool_type: self.tool_type.to_string(),
            })?;
        let qty = to_base_quantity(raw, &self.properties.unit, pixels_per_foot, kind);
        Ok(resolve_bom(&self.to_bom_input(qty)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r##"{
        "name": "Interior Wall - 1/2\" Drywall",
        "description": "Standard partition",
        "is_active": true,
        "category": "Drywall",
        "template_data": {
            "id": "tpl-1",
            "toolType": "linear",
            "properties": {
                "name": "Interior Wall",
                "unit": "ft",
                "color": "#ff0000",
                "group": "Walls",
                "formula": "qty",
                "unitCost": 0,
                "deduction": false,
                "variables": [{ "id": "v1", "name": "wall_height", "unit": "ft", "value": 8 }],
                "subItems": [
                    { "id": "s1", "name": "Drywall Sheets", "unit": "ea", "unitPrice": 14.5,
                      "quantityFormula": "roundup((qty * wall_height * 2) / 32)" }
                ]
            }
        },
        "created_at": "2024-01-01T00:00:00Z"
    }"##;

    fn parse(json: &str) -> Template {
        let record: TemplateRecord = serde_json::from_str(json).unwrap();
        record.into()
    }

    #[test]
    fn test_parse_seed_record() {
        let template = parse(SEED);
        assert_eq!(template.id, "tpl-1");
        assert_eq!(template.display_name(), "Interior Wall - 1/2\" Drywall");
        assert_eq!(template.category, "Drywall");
        assert_eq!(template.tool_type, MarkupKind::Linear);
        assert_eq!(template.properties.sub_items.len(), 1);
        assert_eq!(template.properties.sub_items[0].unit_price, 14.5);
        assert_eq!(template.properties.variables[0].value, 8.0);
    }

    #[test]
    fn test_parse_plain_template() {
        let template = parse(
            r#"{ "toolType": "count", "properties": { "name": "Outlets", "unitCost": 45 } }"#,
        );
        assert_eq!(template.tool_type, MarkupKind::Count);
        assert_eq!(template.display_name(), "Outlets");
        assert_eq!(template.properties.unit_cost, 45.0);
        assert!(template.properties.formula.is_empty());
    }

    #[test]
    fn test_price_linear_seed() {
        let template = parse(SEED);
        // 480px at 48px/ft is 10ft; 10 * 8 * 2 / 32 = 5 sheets.
        let result = template.price(480.0, 48.0).unwrap();
        assert_eq!(result.display_quantity, 10.0);
        assert_eq!(result.sub_items[0].quantity, 5.0);
        assert_eq!(result.grand_total, 72.5);
    }

    #[test]
    fn test_deduction_round_trips() {
        let mut template = parse(SEED);
        template.properties.deduction = true;
        let json = serde_json::to_string(&template).unwrap();
        let reparsed = parse(&json);
        assert!(reparsed.properties.deduction);
        assert_eq!(reparsed, template);
    }

    #[test]
    fn test_price_annotation_is_rejected() {
        let template = parse(r#"{ "toolType": "note" }"#);
        assert!(matches!(
            template.price(1.0, 12.0),
            Err(TakeoffError::NotMeasurable { .. })
        ));
    }
}
