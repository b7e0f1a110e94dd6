//! Two-phase matching of tables and fields between an old and a new snapshot.
//!
//! Matching is tolerant of logical renames: an entity whose declared name
//! changed still matches as long as its physical identifier is stable, and
//! the same rule applies per field within a matched table pair. A logical
//! name match always wins over a physical fallback candidate.

use indexmap::IndexMap;

use crate::snapshot::{FieldDescriptor, Snapshot};

/// Pair entities of `new` with entities of `old`.
///
/// Returns a map of new entity name to old entity name. Entities absent
/// from the result are creations (new side) or drops (old side). Both
/// phases iterate in snapshot order, so the first candidate encountered
/// wins deterministically.
pub fn match_tables(new: &Snapshot, old: &Snapshot) -> IndexMap<String, String> {
    let mut matches = IndexMap::new();
    for (name, table) in new.iter() {
        if old.contains(name) {
            matches.insert(name.to_string(), name.to_string());
            continue;
        }
        let fallback = old
            .iter()
            .find(|(_, candidate)| candidate.physical_name == table.physical_name);
        if let Some((old_name, _)) = fallback {
            matches.insert(name.to_string(), old_name.to_string());
        }
    }
    matches
}

/// Pair fields of two matched tables, new field name to old field name.
///
/// Same two-phase rule as [`match_tables`]: exact logical name first, then
/// the first old field with the same physical column name.
pub fn match_fields(new_fields: &[FieldDescriptor], old_fields: &[FieldDescriptor]) -> IndexMap<String, String> {
    let mut matches = IndexMap::new();
    for field in new_fields {
        if old_fields.iter().any(|f| f.name == field.name) {
            matches.insert(field.name.clone(), field.name.clone());
            continue;
        }
        let fallback = old_fields
            .iter()
            .find(|candidate| candidate.physical_name == field.physical_name);
        if let Some(old_field) = fallback {
            matches.insert(field.name.clone(), old_field.name.clone());
        }
    }
    matches
}
