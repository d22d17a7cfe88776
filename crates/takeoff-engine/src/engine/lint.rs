//! Authoring-time formula checks.
//!
//! Pricing never fails on a bad formula; it quietly falls back to a
//! default. These checks report what the fallback hid: syntax errors,
//! references that read as 0, and sub-items that refer to items declared
//! after them.

use serde::Serialize;
use std::fmt;

use super::bom::BomInput;
use super::context::Context;
use super::error::FormulaError;
use super::eval::Formula;
use super::ident::normalize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The formula cannot be evaluated at all.
    Invalid { error: String },
    /// `[name]` matched nothing and reads as 0.
    UnresolvedReference { name: String },
    /// `[name]` names a sub-item declared later; it reads as 0.
    ForwardReference { name: String, target: String },
    /// A sub-item formula refers to its own name.
    SelfReference { name: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Sub-item name, or `None` for the top formula.
    pub subject: Option<String>,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        let subject = self.subject.as_deref().unwrap_or("formula");
        match &self.kind {
            DiagnosticKind::Invalid { error } => write!(f, "{}: {}: {}", level, subject, error),
            DiagnosticKind::UnresolvedReference { name } => {
                write!(f, "{}: {}: [{}] is not defined and reads as 0", level, subject, name)
            }
            DiagnosticKind::ForwardReference { name, target } => write!(
                f,
                "{}: {}: [{}] refers to \"{}\", which is declared later and reads as 0",
                level, subject, name, target
            ),
            DiagnosticKind::SelfReference { name } => {
                write!(f, "{}: {}: [{}] refers to itself and reads as 0", level, subject, name)
            }
        }
    }
}

fn invalid(subject: Option<&str>, error: &FormulaError) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error,
        subject: subject.map(str::to_string),
        kind: DiagnosticKind::Invalid {
            error: error.to_string(),
        },
    }
}

/// Stand-in measured quantity when the context has none.
const SAMPLE_QTY: f64 = 1.0;

/// Check one formula against a context. An empty formula is not an error.
///
/// `qty` is always bound when pricing, so a context without one is checked
/// with a sample quantity.
pub fn lint_formula(formula: &str, ctx: &Context) -> Vec<Diagnostic> {
    if ctx.qty().is_some() {
        return lint_in(formula, ctx, None).0;
    }
    let mut sampled = ctx.clone();
    sampled.set_qty(SAMPLE_QTY);
    lint_in(formula, &sampled, None).0
}

/// Returns the diagnostics and the value used downstream (0 on failure).
fn lint_in(formula: &str, ctx: &Context, subject: Option<&str>) -> (Vec<Diagnostic>, Option<f64>) {
    if formula.trim().is_empty() {
        return (Vec::new(), None);
    }
    let parsed = match Formula::parse(formula) {
        Ok(parsed) => parsed,
        Err(err) => return (vec![invalid(subject, &err)], None),
    };
    match parsed.eval(ctx) {
        Ok(evaluation) => {
            let diagnostics = evaluation
                .unresolved
                .into_iter()
                .map(|name| Diagnostic {
                    severity: Severity::Warning,
                    subject: subject.map(str::to_string),
                    kind: DiagnosticKind::UnresolvedReference { name },
                })
                .collect();
            (diagnostics, Some(evaluation.value))
        }
        Err(err) => (vec![invalid(subject, &err)], None),
    }
}

fn same_name(reference: &str, name: &str) -> bool {
    if reference == name {
        return true;
    }
    let ident = normalize(reference);
    !ident.is_empty() && ident == normalize(name)
}

/// Check the top formula and every sub-item in declaration order.
///
/// Each sub-item is checked against the context it is priced with, so a
/// reference to a later sub-item shows up as a forward reference rather
/// than a plain unresolved name.
pub fn lint_bom(input: &BomInput) -> Vec<Diagnostic> {
    let mut ctx = input.base_context();
    let mut diagnostics = lint_in(&input.formula, &ctx, None).0;

    for (idx, sub) in input.sub_items.iter().enumerate() {
        let (found, value) = lint_in(&sub.quantity_formula, &ctx, Some(&sub.name));
        for diagnostic in found {
            let DiagnosticKind::UnresolvedReference { name } = &diagnostic.kind else {
                diagnostics.push(diagnostic);
                continue;
            };
            let kind = if same_name(name, &sub.name) {
                DiagnosticKind::SelfReference { name: name.clone() }
            } else if let Some(later) = input.sub_items[idx + 1..]
                .iter()
                .find(|later| same_name(name, &later.name))
            {
                DiagnosticKind::ForwardReference {
                    name: name.clone(),
                    target: later.name.clone(),
                }
            } else {
                diagnostic.kind.clone()
            };
            diagnostics.push(Diagnostic { kind, ..diagnostic });
        }
        ctx.bind(sub.name.as_str(), value.unwrap_or(0.0));
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bom::{SubItemDefinition, Variable};

    #[test]
    fn test_lint_clean_formula() {
        let ctx: Context = [("wall_height", 10.0)].into_iter().collect();
        assert!(lint_formula("qty * [wall_height]", &ctx).is_empty());
        assert!(lint_formula("", &ctx).is_empty());
        assert!(lint_formula("roundup(Qty / 0.5)", &Context::new()).is_empty());
    }

    #[test]
    fn test_lint_syntax_error() {
        let found = lint_formula("roundup(qty", &Context::with_qty(1.0));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Error);
        assert!(matches!(found[0].kind, DiagnosticKind::Invalid { .. }));
    }

    #[test]
    fn test_lint_unresolved_reference() {
        let found = lint_formula("[Wall Hieght] * 2", &Context::with_qty(1.0));
        assert_eq!(
            found,
            vec![Diagnostic {
                severity: Severity::Warning,
                subject: None,
                kind: DiagnosticKind::UnresolvedReference {
                    name: "Wall Hieght".to_string()
                },
            }]
        );
    }

    #[test]
    fn test_lint_bom_forward_and_self_references() {
        let input = BomInput {
            formula: "qty".to_string(),
            variables: vec![Variable::new("height", 8.0)],
            measured_qty: 10.0,
            sub_items: vec![
                SubItemDefinition::new("Studs", "[Drywall Sheets] + [Studs]", 1.0),
                SubItemDefinition::new("Drywall Sheets", "qty * [height] / 32", 1.0),
                SubItemDefinition::new("Tape", "[Drywall_Sheets] / 40 + [Nope]", 1.0),
            ],
            unit_cost: 0.0,
        };
        let found = lint_bom(&input);
        assert_eq!(found.len(), 3);
        assert_eq!(
            found[0].kind,
            DiagnosticKind::ForwardReference {
                name: "Drywall Sheets".to_string(),
                target: "Drywall Sheets".to_string(),
            }
        );
        assert_eq!(found[0].subject.as_deref(), Some("Studs"));
        assert_eq!(found[1].kind, DiagnosticKind::SelfReference { name: "Studs".to_string() });
        assert_eq!(
            found[2].kind,
            DiagnosticKind::UnresolvedReference { name: "Nope".to_string() }
        );
        assert_eq!(found[2].subject.as_deref(), Some("Tape"));
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic {
            severity: Severity::Warning,
            subject: Some("Tape".to_string()),
            kind: DiagnosticKind::UnresolvedReference { name: "x".to_string() },
        };
        assert_eq!(d.to_string(), "warning: Tape: [x] is not defined and reads as 0");
    }
}
