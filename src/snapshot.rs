//! Snapshot types describing the shape of a schema at one point in time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable description of a set of tables, keyed by entity name.
///
/// Snapshots are produced by collaborators, either from declared models or
/// from live database metadata, and are never mutated by the diff engine.
/// Iteration order is insertion order, which keeps matcher tie-breaks
/// deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    tables: IndexMap<String, TableDescriptor>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, keyed by its entity name. Last insert wins for
    /// duplicate names; unique names are a producer precondition.
    pub fn insert(&mut self, table: TableDescriptor) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Tables in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TableDescriptor)> {
        self.tables.iter().map(|(name, table)| (name.as_str(), table))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<TableDescriptor> for Snapshot {
    fn from_iter<I: IntoIterator<Item = TableDescriptor>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for table in iter {
            snapshot.insert(table);
        }
        snapshot
    }
}

/// One table-level entity within a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Logical entity name (e.g. "UserProfile")
    pub name: String,

    /// Storage-level table identifier. May differ from `name`.
    pub physical_name: String,

    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
}

impl TableDescriptor {
    /// Create a table whose physical name equals its logical name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            physical_name: name.clone(),
            name,
            fields: Vec::new(),
        }
    }

    pub fn with_physical_name(mut self, physical_name: impl Into<String>) -> Self {
        self.physical_name = physical_name.into();
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One column-level field within a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Logical field name
    pub name: String,

    /// Storage-level column identifier. May differ from `name`.
    pub physical_name: String,

    /// Collaborator-defined type label (e.g. "varchar", "integer")
    #[serde(rename = "type")]
    pub type_tag: String,

    /// Whether a plain index is declared on this field
    #[serde(default, skip_serializing_if = "is_false")]
    pub index: bool,

    /// Whether a unique index is declared on this field
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,

    /// Whether the column accepts NULL
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,

    /// Opaque implementation-defined attributes (e.g. foreign-key target)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl FieldDescriptor {
    /// Create a field whose physical name equals its logical name.
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            physical_name: name.clone(),
            name,
            type_tag: type_tag.into(),
            index: false,
            unique: false,
            nullable: false,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_physical_name(mut self, physical_name: impl Into<String>) -> Self {
        self.physical_name = physical_name.into();
        self
    }

    pub fn indexed(mut self) -> Self {
        self.index = true;
        self
    }

    pub fn uniq(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_order() {
        let snapshot: Snapshot = [
            TableDescriptor::new("Zebra"),
            TableDescriptor::new("Apple"),
            TableDescriptor::new("Mango"),
        ]
        .into_iter()
        .collect();

        let names: Vec<_> = snapshot.names().collect();
        assert_eq!(names, vec!["Zebra", "Apple", "Mango"]);
    }

    #[test]
    fn physical_name_defaults_to_logical() {
        let table = TableDescriptor::new("User");
        assert_eq!(table.physical_name, "User");

        let field = FieldDescriptor::new("email", "varchar");
        assert_eq!(field.physical_name, "email");
    }

    #[test]
    fn field_lookup_by_logical_name() {
        let table = TableDescriptor::new("User")
            .with_field(FieldDescriptor::new("id", "integer"))
            .with_field(FieldDescriptor::new("email", "varchar").with_physical_name("email_addr"));

        assert_eq!(table.field("email").unwrap().physical_name, "email_addr");
        assert!(table.field("missing").is_none());
    }

    #[test]
    fn snapshot_serialization_round_trip() {
        let snapshot: Snapshot = [TableDescriptor::new("User")
            .with_physical_name("users")
            .with_field(FieldDescriptor::new("email", "varchar").uniq().nullable())]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();

        let table = parsed.get("User").unwrap();
        assert_eq!(table.physical_name, "users");
        let field = table.field("email").unwrap();
        assert!(field.unique);
        assert!(field.nullable);
        assert!(!field.index);
    }

    #[test]
    fn flags_are_omitted_when_false() {
        let field = FieldDescriptor::new("id", "integer");
        let json = serde_json::to_string(&field).unwrap();
        assert!(!json.contains("index"));
        assert!(!json.contains("unique"));
        assert!(!json.contains("nullable"));
        assert!(!json.contains("extra"));
    }
}
