//! Project markups and the estimate built from them.

mod cache;
mod markup;
mod rollup;

pub use cache::BomCache;
pub use markup::{Markup, MarkupKind, MarkupProperties, PageScale, Project};
pub use rollup::{
    EstimateItem, EstimateTotals, GroupTotal, UNGROUPED, build_estimate, build_estimate_cached,
};
