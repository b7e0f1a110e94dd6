use std::path::PathBuf;

use thiserror::Error;

/// Error type returned by a migration script, opaque to the core.
pub type ScriptError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type for journal and runner operations.
///
/// The matcher and diff engine are total functions over well-formed
/// snapshots and never produce these. Journal reads degrade to empty
/// state silently; only writes surface here.
#[derive(Debug, Error)]
pub enum Error {
    /// Persisting a journal file failed. Never silent: a failed write
    /// would otherwise lose applied/required state.
    #[error("failed to write journal file {}: {source}", .path.display())]
    JournalWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding journal state as JSON failed.
    #[error("failed to encode journal file {}: {source}", .path.display())]
    JournalEncode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No revision matches the given hash or prefix.
    #[error("revision '{prefix}' not found")]
    RevisionNotFound { prefix: String },

    /// More than one revision matches a prefix; the caller must disambiguate.
    #[error("revision prefix '{prefix}' is ambiguous ({} matches)", .matches.len())]
    AmbiguousRevision { prefix: String, matches: Vec<String> },

    /// Revert was requested for a revision that is not applied.
    #[error("revision '{hash}' is not applied")]
    RevisionNotApplied { hash: String },

    /// Apply was requested before all dependencies were applied. The
    /// journal is left untouched.
    #[error("dependencies not applied for '{revision}': {}", .unmet.join(", "))]
    DependenciesUnmet { revision: String, unmet: Vec<String> },

    /// The emission collaborator failed mid-run. The journal reflects the
    /// pre-run state, so retrying is safe.
    #[error("migration script failed for '{revision}': {source}")]
    Script {
        revision: String,
        #[source]
        source: ScriptError,
    },
}
