//! Logical type name → logical type
//!
//! Only concrete classes with type identity are registered. Registration is
//! idempotent by name. A name already bound to a different class is kept
//! and the collision is logged; rejecting it is left to the
//! logical-type-name uniqueness validator, which sees the final graph.

use causeway_core::LogicalType;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::warn;

/// Resolves logical type names (and aliases) to their logical type
#[derive(Debug, Default)]
pub struct LogicalTypeResolver {
    by_name: DashMap<String, LogicalType>,
}

impl LogicalTypeResolver {
    /// Empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical type registered under `logical_type_name`
    pub fn lookup(&self, logical_type_name: &str) -> Option<LogicalType> {
        self.by_name.get(logical_type_name).map(|e| e.value().clone())
    }

    /// Register `logical_type` under its own name
    pub fn register(&self, logical_type: &LogicalType) {
        if !Self::is_registrable(logical_type) {
            return;
        }
        self.put(logical_type.logical_name(), logical_type);
    }

    /// Register `logical_type` under each of `aliases`; lookups by alias
    /// yield the canonical logical type
    pub fn register_aliases(&self, logical_type: &LogicalType, aliases: &[String]) {
        if aliases.is_empty() || !Self::is_registrable(logical_type) {
            return;
        }
        for alias in aliases {
            self.put(alias, logical_type);
        }
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Forget everything
    pub fn clear(&self) {
        self.by_name.clear();
    }

    fn is_registrable(logical_type: &LogicalType) -> bool {
        let class = logical_type.corresponding_class();
        !class.is_abstract() && class.has_type_identity()
    }

    fn put(&self, name: &str, logical_type: &LogicalType) {
        match self.by_name.entry(name.to_string()) {
            Entry::Occupied(existing) => {
                let existing = existing.get();
                if existing.corresponding_class() != logical_type.corresponding_class() {
                    warn!(
                        target: "causeway::metamodel",
                        name,
                        existing = %existing.corresponding_class(),
                        rejected = %logical_type.corresponding_class(),
                        "Logical type name already in use; keeping the first registration"
                    );
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(logical_type.clone());
            }
        }
    }
}
