//! takeoff-core - template libraries, estimate rollup and export.

pub mod error;
pub mod estimate;
pub mod storage;
pub mod template;

pub use error::{Result, TakeoffError};
pub use estimate::{BomCache, EstimateItem, EstimateTotals, Markup, MarkupKind, Project};
pub use template::{Template, TemplateProperties};

pub use takeoff_engine::engine::{BomInput, BomResult};
