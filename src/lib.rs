//! remold: schema snapshot diffing and a durable migration journal.
//!
//! The crate covers two concerns for a schema-evolution toolchain:
//!
//! - **Diffing**: [`Snapshot`]s describe the shape of a schema (tables,
//!   columns, column attributes). [`diff_snapshots`] matches entities
//!   between two snapshots (tolerating logical renames via stable
//!   physical identifiers) and derives an ordered [`ChangeSet`] of
//!   structural operations.
//! - **Journaling**: the [`Journal`] durably tracks which revisions are
//!   applied and which are required, and the [`Runner`] gates application
//!   on dependency readiness with a retry-safe emission-before-journal
//!   ordering.
//!
//! Producing snapshots (introspection) and turning change sets into DDL
//! or code (emission) are collaborator concerns; the seams are the
//! [`Snapshot`] input format and the [`MigrationScript`] trait.

pub mod diff;
pub mod errors;
pub mod journal;
pub mod matcher;
pub mod revision;
pub mod runner;
pub mod snapshot;

pub use diff::{ChangeSet, FieldCreate, IndexAction, IndexChange, NullAction, NullabilityChange, diff_snapshots};
pub use errors::{Error, ScriptError};
pub use journal::{APPLIED_FILE, Journal, REQUIRED_FILE, Status};
pub use matcher::{match_fields, match_tables};
pub use revision::{Revision, RevisionSet};
pub use runner::{MigrationScript, Runner};
pub use snapshot::{FieldDescriptor, Snapshot, TableDescriptor};
