//! File-backed ledger of applied and required revisions.
//!
//! Two JSON files inside the journal directory hold the durable state:
//! `applied.json` (set of applied hashes) and `required.json` (ordered
//! list of mandatory hashes). Absence or a parse failure of either file
//! reads as empty state; write failures are fatal. Every mutating call
//! persists synchronously before returning, so a crash between calls
//! never loses an acknowledged mark.
//!
//! The journal assumes a single mutating process at a time. There is no
//! locking or merge strategy; concurrent writers can race.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::errors::Error;
use crate::revision::Revision;

/// Applied-set file name inside the journal directory.
pub const APPLIED_FILE: &str = "applied.json";

/// Required-list file name inside the journal directory.
pub const REQUIRED_FILE: &str = "required.json";

/// Application status of a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Not yet applied (the default for unknown hashes)
    Available,
    /// Applied to the target database
    Applied,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Available => write!(f, "available"),
            Status::Applied => write!(f, "applied"),
        }
    }
}

/// Durable applied/required bookkeeping over revision hashes.
///
/// `apply` and `revert` only move the journal mark. Running the actual
/// structural changes belongs to the emission collaborator and must
/// happen-before the mark in the surrounding workflow, so that a crash
/// before journaling leaves an apply retry-safe (see [`crate::runner`]).
#[derive(Debug, Clone)]
pub struct Journal {
    dir: PathBuf,
}

impl Journal {
    /// Open a journal rooted at `dir`. The directory is created lazily on
    /// first write; a missing directory reads as empty state.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All applied revision hashes. Read failures degrade to empty.
    pub fn get_applied(&self) -> BTreeSet<String> {
        self.read_hashes(APPLIED_FILE).into_iter().collect()
    }

    /// The required list, in declaration order. Read failures degrade to empty.
    pub fn get_required(&self) -> Vec<String> {
        self.read_hashes(REQUIRED_FILE)
    }

    /// Application status of a hash. Unknown hashes are `Available`.
    pub fn check_status(&self, hash: &str) -> Status {
        if self.get_applied().contains(hash) {
            Status::Applied
        } else {
            Status::Available
        }
    }

    /// Position of a hash in the required list, if it is required.
    pub fn required_position(&self, hash: &str) -> Option<usize> {
        self.get_required().iter().position(|required| required == hash)
    }

    /// True iff every dependency of `revision` is applied.
    pub fn check_dependencies(&self, revision: &Revision) -> bool {
        self.unmet_dependencies(revision).is_empty()
    }

    /// Dependencies of `revision` that are not yet applied, in order.
    pub fn unmet_dependencies(&self, revision: &Revision) -> Vec<String> {
        let applied = self.get_applied();
        revision
            .dependencies
            .iter()
            .filter(|dep| !applied.contains(*dep))
            .cloned()
            .collect()
    }

    /// Mark a hash applied. Idempotent at the data level: re-applying is a
    /// caller decision, not a journal invariant.
    pub fn apply(&self, hash: &str) -> Result<(), Error> {
        let mut applied = self.get_applied();
        applied.insert(hash.to_string());
        debug!("journal: mark applied {hash}");
        self.write_hashes(APPLIED_FILE, applied.iter().cloned().collect())
    }

    /// Remove the applied mark for a hash. Only valid from `Applied`.
    pub fn revert(&self, hash: &str) -> Result<(), Error> {
        let mut applied = self.get_applied();
        if !applied.remove(hash) {
            return Err(Error::RevisionNotApplied {
                hash: hash.to_string(),
            });
        }
        debug!("journal: unmark applied {hash}");
        self.write_hashes(APPLIED_FILE, applied.into_iter().collect())
    }

    /// Declare a hash required. Inserts at the end by default, or right
    /// after `after` when given; a missing `after` falls back to the end.
    pub fn mark_required(&self, hash: &str, after: Option<&str>) -> Result<(), Error> {
        let mut required = self.get_required();
        let position = after
            .and_then(|anchor| required.iter().position(|existing| existing == anchor))
            .map(|index| index + 1)
            .unwrap_or(required.len());
        required.insert(position, hash.to_string());
        debug!("journal: mark required {hash} at position {position}");
        self.write_hashes(REQUIRED_FILE, required)
    }

    fn read_hashes(&self, file: &str) -> Vec<String> {
        let path = self.dir.join(file);
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    fn write_hashes(&self, file: &str, hashes: Vec<String>) -> Result<(), Error> {
        let path = self.dir.join(file);
        let json = serde_json::to_string(&hashes).map_err(|source| Error::JournalEncode {
            path: path.clone(),
            source,
        })?;
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|source| Error::JournalWrite {
                path: path.clone(),
                source,
            })?;
        }
        fs::write(&path, json).map_err(|source| Error::JournalWrite { path, source })
    }
}
