//! Formula evaluation.
//!
//! [`evaluate`] is the total entry point used when pricing: any failure
//! becomes `None` and the caller falls back to a default. [`evaluate_detailed`]
//! keeps the failure and the list of unresolved references for editors and
//! linters.

use tracing::{debug, warn};

use super::ast::{Expr, UnaryOp};
use super::context::Context;
use super::error::FormulaError;
use super::parser::parse;

/// A parsed formula. Parse once when evaluating against many contexts.
#[derive(Clone, Debug, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

/// A successful evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    /// Bracketed references that matched nothing and were read as 0, in
    /// source order, without duplicates.
    pub unresolved: Vec<String>,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Formula, FormulaError> {
        let expr = parse(source)?;
        Ok(Formula {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Bracketed reference names in source order, without duplicates.
    pub fn references(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        self.expr.walk(&mut |node| {
            if let Expr::Reference { name, .. } = node {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        });
        names
    }

    /// Bare identifiers in source order, without duplicates.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        self.expr.walk(&mut |node| {
            if let Expr::Identifier { name, .. } = node {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        });
        names
    }

    pub fn eval(&self, ctx: &Context) -> Result<Evaluation, FormulaError> {
        let mut unresolved = Vec::new();
        let value = eval_expr(&self.expr, ctx, &mut unresolved)?;
        if !value.is_finite() {
            return Err(FormulaError::NonFinite);
        }
        Ok(Evaluation { value, unresolved })
    }
}

fn eval_expr(expr: &Expr, ctx: &Context, unresolved: &mut Vec<String>) -> Result<f64, FormulaError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Reference { name, .. } => match ctx.resolve_reference(name) {
            Some(v) => Ok(v),
            None => {
                if !unresolved.contains(name) {
                    unresolved.push(name.clone());
                }
                Ok(0.0)
            }
        },
        Expr::Identifier { name, .. } => ctx
            .resolve_identifier(name)
            .ok_or_else(|| FormulaError::UnknownIdentifier(name.clone())),
        Expr::Unary { op, expr } => {
            let v = eval_expr(expr, ctx, unresolved)?;
            Ok(match op {
                UnaryOp::Neg => -v,
                UnaryOp::Plus => v,
            })
        }
        Expr::Binary { op, lhs, rhs } => {
            let l = eval_expr(lhs, ctx, unresolved)?;
            let r = eval_expr(rhs, ctx, unresolved)?;
            Ok(op.apply(l, r))
        }
        Expr::Call { function, args } => {
            let values = args
                .iter()
                .map(|arg| eval_expr(arg, ctx, unresolved))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(function.apply(&values))
        }
    }
}

/// Parse and evaluate, keeping the failure reason.
pub fn evaluate_detailed(formula: &str, ctx: &Context) -> Result<Evaluation, FormulaError> {
    let result = Formula::parse(formula).and_then(|f| f.eval(ctx));
    match &result {
        Ok(evaluation) if !evaluation.unresolved.is_empty() => {
            debug!(formula, unresolved = ?evaluation.unresolved, "formula references unresolved names");
        }
        Err(err @ FormulaError::Unsafe { .. }) => {
            warn!(formula, error = %err, "rejected formula");
        }
        Err(FormulaError::Empty) | Ok(_) => {}
        Err(err) => {
            debug!(formula, error = %err, "formula did not evaluate");
        }
    }
    result
}

/// Evaluate `formula` against `ctx`.
///
/// Returns `None` for an empty formula and for every failure: malformed
/// syntax, disallowed content, an unknown bare identifier, or a non-finite
/// result. `None` means "not computed", which callers must not read as 0.
///
/// ```
/// use takeoff_engine::engine::{Context, evaluate};
/// let ctx = Context::with_qty(25.0);
/// assert_eq!(evaluate("roundup(qty / 10)", &ctx), Some(3.0));
/// assert_eq!(evaluate("   ", &ctx), None);
/// ```
pub fn evaluate(formula: &str, ctx: &Context) -> Option<f64> {
    evaluate_detailed(formula, ctx).ok().map(|e| e.value)
}
