//! Resolved-type cache.
//!
//! Key space: `(scope id, raw type string, slot)`.  The scope id stands in
//! for the whole name-resolution context (namespace, imports and own
//! type), so two declarations sharing a scope share entries.  Only
//! successful resolutions are stored; entries are never evicted.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{Slot, Type};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    scope_id: String,
    raw: String,
    slot: Slot,
}

#[derive(Debug, Default)]
pub struct TypeCache {
    entries: RwLock<HashMap<CacheKey, Type>>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, scope_id: &str, raw: &str, slot: Slot) -> Option<Type> {
        let key = CacheKey {
            scope_id: scope_id.to_string(),
            raw: raw.to_string(),
            slot,
        };
        self.entries.read().get(&key).cloned()
    }

    /// Store a resolution.  The first value stored for a key is kept.
    pub fn insert(&self, scope_id: &str, raw: &str, slot: Slot, ty: &Type) {
        let key = CacheKey {
            scope_id: scope_id.to_string(),
            raw: raw.to_string(),
            slot,
        };
        self.entries.write().entry(key).or_insert_with(|| ty.clone());
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
