//! Error types for Takeoff core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading libraries and projects or writing exports.
#[derive(Error, Debug)]
pub enum TakeoffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Refusing to read {path}: file too large ({size} bytes, max {max})")]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template \"{name}\" has no measurable tool type ({tool_type})")]
    NotMeasurable { name: String, tool_type: String },

    #[error("Nothing to export")]
    EmptyEstimate,

    #[error("Unknown CSV column: {0}")]
    UnknownColumn(String),
}

pub type Result<T> = std::result::Result<T, TakeoffError>;
