//! Memoized BOM resolution.
//!
//! Pricing is pure, so results can be shared between markups that carry the
//! same template at the same measured quantity, and across threads.

use dashmap::DashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use takeoff_engine::engine::{BomInput, BomResult, resolve_bom};

const DEFAULT_MAX_ENTRIES: usize = 4096;

/// Hash of everything that affects a result. Floats hash by bit pattern.
fn input_key(input: &BomInput) -> u64 {
    let mut hasher = DefaultHasher::new();
    input.formula.hash(&mut hasher);
    input.measured_qty.to_bits().hash(&mut hasher);
    input.unit_cost.to_bits().hash(&mut hasher);
    input.variables.len().hash(&mut hasher);
    for var in &input.variables {
        var.name.hash(&mut hasher);
        var.value.to_bits().hash(&mut hasher);
    }
    input.sub_items.len().hash(&mut hasher);
    for sub in &input.sub_items {
        sub.name.hash(&mut hasher);
        sub.unit.hash(&mut hasher);
        sub.unit_price.to_bits().hash(&mut hasher);
        sub.quantity_formula.hash(&mut hasher);
    }
    hasher.finish()
}

#[derive(Debug)]
pub struct BomCache {
    entries: DashMap<u64, (BomInput, BomResult)>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for BomCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BomCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// A cache that empties itself once it holds `max_entries` results.
    pub fn with_capacity(max_entries: usize) -> Self {
        BomCache {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Same result as [`resolve_bom`], computed at most once per input.
    pub fn resolve(&self, input: &BomInput) -> BomResult {
        let key = input_key(input);
        if let Some(entry) = self.entries.get(&key) {
            // Colliding keys fall through to a recompute.
            if entry.0 == *input {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return entry.1.clone();
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = resolve_bom(input);
        if self.entries.len() >= self.max_entries {
            tracing::debug!(entries = self.entries.len(), "bom cache full, clearing");
            self.entries.clear();
        }
        self.entries.insert(key, (input.clone(), result.clone()));
        result
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
