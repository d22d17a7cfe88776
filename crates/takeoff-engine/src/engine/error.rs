//! Formula failure taxonomy.
//!
//! None of these reach the end user as an error. [`super::evaluate`]
//! collapses all of them to "no result"; the detailed form exists for
//! authoring-time diagnostics.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Formula is empty")]
    Empty,

    #[error("Malformed formula at {pos}: {message}")]
    Malformed { pos: usize, message: String },

    #[error("Formula contains disallowed content: {token}")]
    Unsafe { token: String },

    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Formula result is not a finite number")]
    NonFinite,
}

impl FormulaError {
    pub(crate) fn malformed(pos: usize, message: impl Into<String>) -> Self {
        FormulaError::Malformed {
            pos,
            message: message.into(),
        }
    }

    pub(crate) fn unsafe_content(token: impl Into<String>) -> Self {
        FormulaError::Unsafe {
            token: token.into(),
        }
    }
}
