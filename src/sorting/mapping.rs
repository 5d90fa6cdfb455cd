use std::collections::HashMap;

use crate::models::ResourceKind;

use super::error::SortError;

/// One underlying storage expression behind a public sort key.
///
/// `reverse` inverts asc/desc for this column only, for keys whose storage
/// representation sorts opposite to the public meaning (e.g. a denormalized
/// rank column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortColumn {
    pub expression: &'static str,
    pub reverse: bool,
}

impl SortColumn {
    pub fn new(expression: &'static str) -> Self {
        Self { expression, reverse: false }
    }

    pub fn reversed(expression: &'static str) -> Self {
        Self { expression, reverse: true }
    }
}

/// A public sort key and the storage columns it expands to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortMappingEntry {
    pub sort_field: &'static str,
    pub columns: Vec<SortColumn>,
}

/// Whitelist of client-facing sort keys for one resource type.
///
/// Anything not declared here is rejected by the compiler before any data
/// access happens.
#[derive(Debug, Clone, Default)]
pub struct SortMapping {
    entries: Vec<SortMappingEntry>,
}

impl SortMapping {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Map a public key to a single storage column.
    pub fn field(mut self, sort_field: &'static str, expression: &'static str) -> Self {
        self.entries.push(SortMappingEntry {
            sort_field,
            columns: vec![SortColumn::new(expression)],
        });
        self
    }

    /// Map a public key to several storage columns, each independently
    /// reversible.
    pub fn compound(mut self, sort_field: &'static str, columns: Vec<SortColumn>) -> Self {
        self.entries.push(SortMappingEntry { sort_field, columns });
        self
    }

    /// Case-insensitive lookup of a public sort key.
    pub fn find(&self, sort_field: &str) -> Option<&SortMappingEntry> {
        self.entries
            .iter()
            .find(|entry| entry.sort_field.eq_ignore_ascii_case(sort_field))
    }

    pub fn entries(&self) -> &[SortMappingEntry] {
        &self.entries
    }
}

/// Registry of sort mappings, keyed by resource kind.
///
/// Populated once at process start and read-only afterwards; the serving
/// state holds it behind an `Arc` so concurrent reads need no locking.
#[derive(Debug, Default)]
pub struct SortMappingRegistry {
    mappings: HashMap<ResourceKind, SortMapping>,
}

impl SortMappingRegistry {
    pub fn new() -> Self {
        Self { mappings: HashMap::new() }
    }

    pub fn register(&mut self, kind: ResourceKind, mapping: SortMapping) -> Result<(), SortError> {
        if self.mappings.contains_key(&kind) {
            return Err(SortError::DuplicateRegistration(kind.as_str().to_string()));
        }
        self.mappings.insert(kind, mapping);
        Ok(())
    }

    pub fn resolve(&self, kind: ResourceKind) -> Result<&SortMapping, SortError> {
        self.mappings
            .get(&kind)
            .ok_or_else(|| SortError::UnknownResourceType(kind.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_duplicate_resource_kind() {
        let mut registry = SortMappingRegistry::new();
        registry
            .register(ResourceKind::Habit, SortMapping::new().field("name", "name"))
            .unwrap();

        let err = registry
            .register(ResourceKind::Habit, SortMapping::new())
            .unwrap_err();
        assert_eq!(err, SortError::DuplicateRegistration("habit".to_string()));
    }

    #[test]
    fn resolve_fails_for_unregistered_kind() {
        let registry = SortMappingRegistry::new();
        let err = registry.resolve(ResourceKind::Tag).unwrap_err();
        assert_eq!(err, SortError::UnknownResourceType("tag".to_string()));
    }

    #[test]
    fn find_is_case_insensitive() {
        let mapping = SortMapping::new().field("createdAtUtc", "created_at_utc");
        assert!(mapping.find("CREATEDATUTC").is_some());
        assert!(mapping.find("created_at").is_none());
    }
}
