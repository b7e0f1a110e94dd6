//! Revision identity and prefix resolution.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// An immutable, dependency-aware unit of schema change.
///
/// Created once at migration-generation time and identified permanently
/// by `hash`. The journal and diff engine never care how or where the
/// matching artifact is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    /// Stable content-addressed identifier
    pub hash: String,

    /// Human title
    pub name: String,

    /// When the revision was generated
    pub created_at: DateTime<Utc>,

    /// Hashes of revisions that must be applied first, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl Revision {
    pub fn new(hash: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            name: name.into(),
            created_at: Utc::now(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, hash: impl Into<String>) -> Self {
        self.dependencies.push(hash.into());
        self
    }
}

/// The revisions known to the surrounding tooling, keyed by hash.
///
/// Supports lookup by hash prefix the way operators type them. An
/// ambiguous prefix is surfaced as an error, never silently resolved.
#[derive(Debug, Clone, Default)]
pub struct RevisionSet {
    revisions: IndexMap<String, Revision>,
}

impl RevisionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, revision: Revision) {
        self.revisions.insert(revision.hash.clone(), revision);
    }

    pub fn get(&self, hash: &str) -> Option<&Revision> {
        self.revisions.get(hash)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Revision> {
        self.revisions.values()
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    /// Resolve a hash prefix to exactly one revision.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<&Revision, Error> {
        let matches: Vec<&Revision> = self
            .revisions
            .values()
            .filter(|rev| rev.hash.starts_with(prefix))
            .collect();

        match matches.as_slice() {
            [] => Err(Error::RevisionNotFound {
                prefix: prefix.to_string(),
            }),
            [revision] => Ok(revision),
            many => Err(Error::AmbiguousRevision {
                prefix: prefix.to_string(),
                matches: many.iter().map(|rev| rev.hash.clone()).collect(),
            }),
        }
    }
}

impl FromIterator<Revision> for RevisionSet {
    fn from_iter<I: IntoIterator<Item = Revision>>(iter: I) -> Self {
        let mut set = RevisionSet::new();
        for revision in iter {
            set.insert(revision);
        }
        set
    }
}
