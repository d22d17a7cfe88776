//! Formula engine API.
//!
//! - [`to_base_quantity`], [`convert_linear`], [`convert_area`] - Measured value to quantity
//! - [`normalize`] - Human names to formula identifiers
//! - [`Formula`], [`evaluate`], [`evaluate_detailed`] - Parse and evaluate formulas
//! - [`Context`] - Measured quantity plus named values a formula can see
//! - [`resolve_bom`] - Price a template's top formula and ordered sub-items
//! - [`lint_formula`], [`lint_bom`] - Authoring diagnostics
//! - [`extract_references`], [`rename_reference`] - Formula text rewriting
//! - [`parse_dimension`] - Construction dimension input
//! - [`format_quantity`], [`format_currency`], [`format_architectural`] - Display strings

mod ast;
mod bom;
mod context;
mod dimension;
mod error;
mod eval;
mod format;
mod functions;
mod ident;
mod lexer;
mod lint;
mod parser;
mod refs;
mod units;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use bom::{
    BomInput, BomResult, SubItemDefinition, SubItemResult, Variable, resolve_bom,
    resolve_bom_parts,
};
pub use context::{Binding, Context, QTY_ALIASES};
pub use dimension::parse_dimension;
pub use error::FormulaError;
pub use eval::{Evaluation, Formula, evaluate, evaluate_detailed};
pub use format::{
    NOT_AVAILABLE, format_architectural, format_currency, format_quantity, format_result,
    format_unit_value,
};
pub use functions::{Arity, BUILTINS, Builtin, Function};
pub use ident::{is_identifier, normalize};
pub use lint::{Diagnostic, DiagnosticKind, Severity, lint_bom, lint_formula};
pub use parser::DENYLIST;
pub use refs::{extract_references, rename_reference};
pub use units::{
    AreaUnit, LEGACY_PIXELS_PER_FOOT, LinearUnit, MeasureKind, Unit, convert_area,
    convert_linear, to_base_quantity, to_pixels_area, to_pixels_linear,
};
