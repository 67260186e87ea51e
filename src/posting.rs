use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use time::OffsetDateTime;

/// Opaque reference to a domain entity. The index stores these references,
/// never copies of entity data; resolving a key back into an entity is the
/// caller's business.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    kind: String,
    name: String,
}

impl EntityKey {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// The persisted unit of the index: one normalized term mapped to the set of
/// entity keys whose text contains it, for one entity kind and field.
///
/// Several records may exist at once for the same (generation, kind, field,
/// term) tuple, one per writer batch. Readers union their match sets and the
/// optimizer later consolidates them into a single record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingRecord {
    /// Index-schema generation this record belongs to. Lets a reindex run
    /// alongside old records without ambiguity.
    pub generation: u64,
    pub entity_kind: String,
    /// Which attribute of the entity produced this term. Empty means the
    /// field was not specified, which older callers relied on.
    pub field: String,
    pub term: String,
    /// Last write time, informational only.
    pub timestamp: OffsetDateTime,
    pub matches: BTreeSet<EntityKey>,
}

impl PostingRecord {
    pub fn new(
        generation: u64,
        entity_kind: impl Into<String>,
        field: impl Into<String>,
        term: impl Into<String>,
    ) -> Self {
        Self {
            generation,
            entity_kind: entity_kind.into(),
            field: field.into(),
            term: term.into(),
            timestamp: OffsetDateTime::now_utc(),
            matches: BTreeSet::new(),
        }
    }
}

/// Explicit index configuration, passed into [`crate::MatchStore`] instead
/// of living in module globals.
#[derive(Debug, Clone, Copy)]
pub struct IndexConfig {
    /// Generation stamped on new records; reads ignore every other one.
    pub generation: u64,
    /// Maximum number of posting records consumed per term lookup. Lookups
    /// hitting the cap are silently truncated, which loses some precision
    /// for extremely popular terms but is never an error.
    pub fetch_limit: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            generation: 1,
            fetch_limit: 999,
        }
    }
}

/// Small descriptive record written once when a store is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub schema_version: u32,
    pub generation: u64,
    pub created_at: String,
}
