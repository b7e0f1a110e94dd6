//! Change derivation between two snapshots.
//!
//! [`diff_snapshots`] is a pure function over well-formed snapshots: it
//! does no I/O and has no failure states. The reverse migration is the
//! same function with `new` and `old` swapped; there is no separate
//! invert operation, which keeps forward and backward logic from drifting.

use serde::{Deserialize, Serialize};

use crate::matcher::{match_fields, match_tables};
use crate::snapshot::Snapshot;

/// Ordered structural delta turning `old` into `new`.
///
/// A value type: built once by [`diff_snapshots`] and handed to the
/// emission layer, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Entity names present only in the new snapshot, in snapshot order
    pub tables_to_create: Vec<String>,

    /// Entity names present only in the old snapshot, in snapshot order
    pub tables_to_drop: Vec<String>,

    /// (old physical name, new physical name) for matched pairs that moved
    pub tables_to_rename: Vec<(String, String)>,

    /// Columns present only on the new side of a matched pair
    pub fields_to_create: Vec<FieldCreate>,

    /// (table physical name, column physical name) for dropped columns
    pub fields_to_drop: Vec<(String, String)>,

    /// Plain and unique index toggles, one entry per flipped flag
    pub index_changes: Vec<IndexChange>,

    /// NOT NULL constraint toggles
    pub nullability_changes: Vec<NullabilityChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.tables_to_create.is_empty()
            && self.tables_to_drop.is_empty()
            && self.tables_to_rename.is_empty()
            && self.fields_to_create.is_empty()
            && self.fields_to_drop.is_empty()
            && self.index_changes.is_empty()
            && self.nullability_changes.is_empty()
    }
}

/// A column to add, tagged with its owner so the emitter can resolve the
/// concrete field definition from the new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCreate {
    /// Physical table name
    pub table: String,

    /// Physical column name
    pub column: String,

    /// Owning entity and logical field, as "Entity.field"
    pub owner: String,
}

/// Whether an index is being added or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexAction {
    Add,
    Drop,
}

/// One index toggle on a matched field.
///
/// Plain and unique indexes are separate categories of the same list: a
/// field moving from plain-indexed to unique yields one drop and one add,
/// never a single alter entry. Collapsing them is the emitter's call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexChange {
    pub action: IndexAction,

    /// Physical table name
    pub table: String,

    /// Physical column name
    pub column: String,

    /// True for a unique index, false for a plain one
    pub unique: bool,
}

/// Whether a column is gaining or losing NULL acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullAction {
    /// Column becomes nullable (NOT NULL dropped)
    AddNull,
    /// Column stops being nullable (NOT NULL added)
    DropNull,
}

/// One nullability toggle on a matched field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullabilityChange {
    pub action: NullAction,

    /// Physical table name
    pub table: String,

    /// Physical column name
    pub column: String,
}

/// Compute the ordered change set transforming `old` into `new`.
pub fn diff_snapshots(new: &Snapshot, old: &Snapshot) -> ChangeSet {
    let matches = match_tables(new, old);
    let mut changes = ChangeSet {
        tables_to_create: new
            .names()
            .filter(|name| !matches.contains_key(*name))
            .map(str::to_string)
            .collect(),
        tables_to_drop: old
            .names()
            .filter(|name| !matches.values().any(|matched| matched == name))
            .map(str::to_string)
            .collect(),
        ..ChangeSet::default()
    };

    for (new_name, old_name) in &matches {
        // Matched names always resolve; the matcher only pairs existing entities.
        let Some(new_table) = new.get(new_name) else { continue };
        let Some(old_table) = old.get(old_name) else { continue };

        if new_table.physical_name != old_table.physical_name {
            changes
                .tables_to_rename
                .push((old_table.physical_name.clone(), new_table.physical_name.clone()));
        }

        let field_matches = match_fields(&new_table.fields, &old_table.fields);

        for old_field in &old_table.fields {
            if field_matches.values().any(|matched| matched == &old_field.name) {
                continue;
            }
            changes
                .fields_to_drop
                .push((new_table.physical_name.clone(), old_field.physical_name.clone()));
        }

        for new_field in &new_table.fields {
            if field_matches.contains_key(&new_field.name) {
                continue;
            }
            changes.fields_to_create.push(FieldCreate {
                table: new_table.physical_name.clone(),
                column: new_field.physical_name.clone(),
                owner: format!("{}.{}", new_table.name, new_field.name),
            });
        }

        for (new_field_name, old_field_name) in &field_matches {
            let Some(new_field) = new_table.field(new_field_name) else { continue };
            let Some(old_field) = old_table.field(old_field_name) else { continue };

            let table = new_table.physical_name.as_str();
            let column = new_field.physical_name.as_str();

            // Plain index toggle: a unique field does not count as plain-indexed.
            let new_plain = new_field.index && !new_field.unique;
            let old_plain = old_field.index && !old_field.unique;
            if new_plain != old_plain {
                changes.index_changes.push(IndexChange {
                    action: if new_plain { IndexAction::Add } else { IndexAction::Drop },
                    table: table.to_string(),
                    column: column.to_string(),
                    unique: false,
                });
            }

            // Unique index toggle, evaluated independently of the plain one.
            if new_field.unique != old_field.unique {
                changes.index_changes.push(IndexChange {
                    action: if new_field.unique { IndexAction::Add } else { IndexAction::Drop },
                    table: table.to_string(),
                    column: column.to_string(),
                    unique: true,
                });
            }

            if new_field.nullable != old_field.nullable {
                changes.nullability_changes.push(NullabilityChange {
                    action: if new_field.nullable {
                        NullAction::AddNull
                    } else {
                        NullAction::DropNull
                    },
                    table: table.to_string(),
                    column: column.to_string(),
                });
            }
        }
    }

    changes
}
