//! Evaluation context: the measured quantity plus named values.
//!
//! Bindings are kept in insertion order with their raw name and normalized
//! identifier side by side, rather than merged into one flat map. Lookups
//! try raw names before normalized ones, and within a tier the most recent
//! binding wins.

use super::ident::{is_identifier, normalize};

/// Names that always mean the measured quantity.
pub const QTY_ALIASES: [&str; 3] = ["qty", "Qty", "QTY"];

#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    pub name: String,
    pub ident: String,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Context {
    qty: Option<f64>,
    bindings: Vec<Binding>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_qty(qty: f64) -> Self {
        Context {
            qty: Some(qty),
            bindings: Vec::new(),
        }
    }

    pub fn qty(&self) -> Option<f64> {
        self.qty
    }

    pub fn set_qty(&mut self, qty: f64) {
        self.qty = Some(qty);
    }

    /// Add a named value. A later binding with the same name shadows the
    /// earlier one. Setting a `qty` alias sets the measured quantity.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        if QTY_ALIASES.contains(&name.as_str()) {
            self.qty = Some(value);
            return;
        }
        self.bind(name, value);
    }

    /// Add a named value without the `qty` alias handling. A binding named
    /// `qty` is stored but never visible: the measured quantity wins.
    pub fn bind(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        let ident = normalize(&name);
        self.bindings.push(Binding { name, ident, value });
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolve the text inside `[...]`.
    ///
    /// Tries the raw name, then the normalized form of both sides. `None`
    /// means unresolved; the evaluator substitutes 0.
    pub fn resolve_reference(&self, name: &str) -> Option<f64> {
        if QTY_ALIASES.contains(&name) {
            if let Some(qty) = self.qty {
                return Some(qty);
            }
        }
        if let Some(b) = self.bindings.iter().rev().find(|b| b.name == name) {
            return Some(b.value);
        }

        let ident = normalize(name);
        if ident.is_empty() {
            return None;
        }
        if QTY_ALIASES.contains(&ident.as_str()) {
            if let Some(qty) = self.qty {
                return Some(qty);
            }
        }
        self.bindings
            .iter()
            .rev()
            .find(|b| b.ident == ident)
            .map(|b| b.value)
    }

    /// Resolve a bare identifier. Only raw names that are themselves valid
    /// identifiers, or normalized identifiers, are visible.
    pub fn resolve_identifier(&self, name: &str) -> Option<f64> {
        if QTY_ALIASES.contains(&name) {
            return self.qty;
        }
        if !is_identifier(name) {
            return None;
        }
        self.bindings
            .iter()
            .rev()
            .find(|b| b.name == name)
            .or_else(|| self.bindings.iter().rev().find(|b| b.ident == name))
            .map(|b| b.value)
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Context {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut ctx = Context::new();
        for (name, value) in iter {
            ctx.insert(name, value);
        }
        ctx
    }
}
