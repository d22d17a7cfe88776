//! Markups as the drawing layer hands them over.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use takeoff_engine::engine::{
    LEGACY_PIXELS_PER_FOOT, MeasureKind, SubItemDefinition, Variable, to_base_quantity,
};

/// Drawing tool that produced a markup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkupKind {
    Select,
    Segment,
    #[default]
    Linear,
    Area,
    Count,
    Note,
    Draw,
    Highlight,
    Legend,
    Ruler,
}

impl MarkupKind {
    /// The quantity kind for priced markups; `None` for annotations.
    pub fn measure_kind(self) -> Option<MeasureKind> {
        match self {
            MarkupKind::Linear | MarkupKind::Segment => Some(MeasureKind::Linear),
            MarkupKind::Area => Some(MeasureKind::Area),
            MarkupKind::Count => Some(MeasureKind::Count),
            MarkupKind::Select
            | MarkupKind::Note
            | MarkupKind::Draw
            | MarkupKind::Highlight
            | MarkupKind::Legend
            | MarkupKind::Ruler => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MarkupKind::Select => "select",
            MarkupKind::Segment => "segment",
            MarkupKind::Linear => "linear",
            MarkupKind::Area => "area",
            MarkupKind::Count => "count",
            MarkupKind::Note => "note",
            MarkupKind::Draw => "draw",
            MarkupKind::Highlight => "highlight",
            MarkupKind::Legend => "legend",
            MarkupKind::Ruler => "ruler",
        }
    }
}

impl fmt::Display for MarkupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Properties shared by measurement and count markups. Fields a tool does
/// not use are simply absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkupProperties {
    pub name: String,
    /// Pixels for linear markups, square pixels (possibly signed) for areas.
    pub value: Option<f64>,
    /// Placed symbols for count markups.
    pub count: Option<f64>,
    pub unit: String,
    pub color: String,
    pub group: String,
    pub formula: String,
    pub variables: Vec<Variable>,
    pub sub_items: Vec<SubItemDefinition>,
    pub unit_cost: f64,
    /// Marks a cut-out shape. Carried so records round-trip; pricing ignores it.
    pub deduction: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Markup {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MarkupKind,
    #[serde(default)]
    pub page_id: String,
    #[serde(default)]
    pub properties: MarkupProperties,
}

impl Markup {
    /// Measured quantity in the markup's unit, or `None` for annotations
    /// and measurements without a value.
    pub fn base_quantity(&self, pixels_per_foot: f64) -> Option<f64> {
        let kind = self.kind.measure_kind()?;
        let props = &self.properties;
        match kind {
            MeasureKind::Count => Some(props.count.unwrap_or(0.0)),
            MeasureKind::Linear | MeasureKind::Area => props
                .value
                .map(|raw| to_base_quantity(raw, &props.unit, pixels_per_foot, kind)),
        }
    }

    /// Unit shown next to the quantity: counts are always `ea`.
    pub fn display_unit(&self) -> &str {
        if self.kind == MarkupKind::Count {
            "ea"
        } else {
            &self.properties.unit
        }
    }
}

/// Page calibration, keyed by page id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageScale {
    pub pixels_per_foot: f64,
}

/// A set of markups plus the calibration of the pages they sit on.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub scales: HashMap<String, PageScale>,
    #[serde(default)]
    pub markups: Vec<Markup>,
}

impl Project {
    /// Calibration for a page, falling back to `default_ppf` and then to the
    /// legacy 12px/ft.
    pub fn pixels_per_foot(&self, page_id: &str, default_ppf: Option<f64>) -> f64 {
        self.scales
            .get(page_id)
            .map(|s| s.pixels_per_foot)
            .filter(|ppf| *ppf > 0.0)
            .or(default_ppf.filter(|ppf| *ppf > 0.0))
            .unwrap_or(LEGACY_PIXELS_PER_FOOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup(kind: MarkupKind, value: Option<f64>, count: Option<f64>, unit: &str) -> Markup {
        Markup {
            id: "m1".to_string(),
            kind,
            page_id: "p1".to_string(),
            properties: MarkupProperties {
                value,
                count,
                unit: unit.to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_base_quantity_by_kind() {
        let linear = markup(MarkupKind::Linear, Some(240.0), None, "ft");
        assert_eq!(linear.base_quantity(24.0), Some(10.0));

        let segment = markup(MarkupKind::Segment, Some(240.0), None, "in");
        assert_eq!(segment.base_quantity(24.0), Some(120.0));

        let area = markup(MarkupKind::Area, Some(-576.0), None, "ft²");
        assert_eq!(area.base_quantity(24.0), Some(1.0));

        let count = markup(MarkupKind::Count, None, Some(6.0), "ea");
        assert_eq!(count.base_quantity(24.0), Some(6.0));
        assert_eq!(count.display_unit(), "ea");

        let note = markup(MarkupKind::Note, Some(1.0), None, "");
        assert_eq!(note.base_quantity(24.0), None);
    }

    #[test]
    fn test_count_without_count_is_zero() {
        let count = markup(MarkupKind::Count, None, None, "");
        assert_eq!(count.base_quantity(12.0), Some(0.0));
    }

    #[test]
    fn test_project_scale_fallbacks() {
        let mut project = Project::default();
        project
            .scales
            .insert("p1".to_string(), PageScale { pixels_per_foot: 48.0 });
        project
            .scales
            .insert("bad".to_string(), PageScale { pixels_per_foot: 0.0 });
        assert_eq!(project.pixels_per_foot("p1", None), 48.0);
        assert_eq!(project.pixels_per_foot("bad", Some(24.0)), 24.0);
        assert_eq!(project.pixels_per_foot("missing", None), LEGACY_PIXELS_PER_FOOT);
    }
}
