//! Dependency-gated application of revisions.
//!
//! The runner owns the crash-ordering contract between emission and
//! journaling: the script runs to completion before the journal mark
//! moves. A crash or script failure during `apply` leaves the revision
//! `Available` (safe to retry); during `revert` it leaves the revision
//! `Applied` (safe to retry the revert). The half-done database state in
//! the failing direction is accepted as manual cleanup, by contract.

use log::info;

use crate::errors::{Error, ScriptError};
use crate::journal::{Journal, Status};
use crate::revision::{Revision, RevisionSet};

/// The emission collaborator seam: a revision's executable forward and
/// backward transformation. The core never inspects what `up`/`down`
/// actually emit or execute.
pub trait MigrationScript {
    fn up(&self) -> Result<(), ScriptError>;
    fn down(&self) -> Result<(), ScriptError>;
}

/// Applies and reverts revisions against a journal.
pub struct Runner {
    journal: Journal,
}

impl Runner {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Run a revision's forward transformation, then journal it.
    ///
    /// Fails with [`Error::DependenciesUnmet`] before touching anything
    /// when a dependency is not applied, listing the unmet hashes.
    pub fn apply(&self, revision: &Revision, script: &dyn MigrationScript) -> Result<(), Error> {
        let unmet = self.journal.unmet_dependencies(revision);
        if !unmet.is_empty() {
            return Err(Error::DependenciesUnmet {
                revision: revision.hash.clone(),
                unmet,
            });
        }
        script.up().map_err(|source| Error::Script {
            revision: revision.hash.clone(),
            source,
        })?;
        self.journal.apply(&revision.hash)?;
        info!("applied revision {} ({})", revision.hash, revision.name);
        Ok(())
    }

    /// Run a revision's backward transformation, then remove the journal mark.
    pub fn revert(&self, revision: &Revision, script: &dyn MigrationScript) -> Result<(), Error> {
        if self.journal.check_status(&revision.hash) != Status::Applied {
            return Err(Error::RevisionNotApplied {
                hash: revision.hash.clone(),
            });
        }
        script.down().map_err(|source| Error::Script {
            revision: revision.hash.clone(),
            source,
        })?;
        self.journal.revert(&revision.hash)?;
        info!("reverted revision {} ({})", revision.hash, revision.name);
        Ok(())
    }

    /// Journal-only apply: mark without running the script. For recovery
    /// after out-of-band application.
    pub fn apply_fake(&self, revision: &Revision) -> Result<(), Error> {
        self.journal.apply(&revision.hash)
    }

    /// Journal-only revert: unmark without running the script.
    pub fn revert_fake(&self, revision: &Revision) -> Result<(), Error> {
        self.journal.revert(&revision.hash)
    }

    /// Required revisions not yet applied, in required-list order.
    pub fn pending(&self) -> Vec<String> {
        let applied = self.journal.get_applied();
        self.journal
            .get_required()
            .into_iter()
            .filter(|hash| !applied.contains(hash))
            .collect()
    }

    /// Bring the project up to date: apply every pending required
    /// revision in order, re-checking dependencies before each one.
    ///
    /// Stops at the first failure and returns it; revisions applied up to
    /// that point stay journaled. Returns the hashes applied.
    pub fn up_to_date<S, F>(&self, revisions: &RevisionSet, mut script_for: F) -> Result<Vec<String>, Error>
    where
        S: MigrationScript,
        F: FnMut(&Revision) -> S,
    {
        let mut done = Vec::new();
        for hash in self.pending() {
            // Required entries are normally full hashes; exact lookup first
            // so an entry that is also a prefix of another hash still resolves.
            let revision = match revisions.get(&hash) {
                Some(revision) => revision,
                None => revisions.resolve_prefix(&hash)?,
            };
            let script = script_for(revision);
            self.apply(revision, &script)?;
            done.push(revision.hash.clone());
        }
        Ok(done)
    }
}
