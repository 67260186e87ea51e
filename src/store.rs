use crate::posting::{IndexConfig, IndexMeta, PostingRecord};
use anyhow::Result;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

const SCHEMA_VERSION: u32 = 1;
const META_KEY: &[u8] = b"meta";

/// The inverted index store: posting records in a single sled tree.
///
/// Tree keys are `term \0 entity_kind \0 field \0 batch_id`, so one ordered
/// keyspace serves every lookup the engine needs: exact terms via a prefix
/// scan, term prefixes and term ranges via raw byte ranges. Values are
/// bincode posting records.
///
/// Writes are additive. Concurrent writers each append records under their
/// own batch id and can never clobber one another; redundant records are
/// merged later by [`crate::optimize_index`].
pub struct MatchStore {
    db: sled::Db,
    postings: sled::Tree,
    meta: sled::Tree,
    config: IndexConfig,
}

impl MatchStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, IndexConfig::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: IndexConfig) -> Result<Self> {
        Self::init(sled::open(path)?, config)
    }

    /// Store backed by a scratch directory that sled removes on drop.
    pub fn temporary(config: IndexConfig) -> Result<Self> {
        Self::init(sled::Config::new().temporary(true).open()?, config)
    }

    fn init(db: sled::Db, config: IndexConfig) -> Result<Self> {
        let postings = db.open_tree("postings")?;
        let meta = db.open_tree("meta")?;
        if meta.get(META_KEY)?.is_none() {
            let created_at = OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default();
            let descriptor = IndexMeta {
                schema_version: SCHEMA_VERSION,
                generation: config.generation,
                created_at,
            };
            meta.insert(META_KEY, serde_json::to_vec(&descriptor)?)?;
        }
        Ok(Self {
            db,
            postings,
            meta,
            config,
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn meta(&self) -> Result<Option<IndexMeta>> {
        match self.meta.get(META_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    /// Monotonic id separating posting records written by different batches.
    pub fn next_batch_id(&self) -> Result<u64> {
        Ok(self.db.generate_id()?)
    }

    /// Write a group of posting records as one atomic batch.
    pub fn put_records(&self, records: &[PostingRecord], batch_id: u64) -> Result<()> {
        let mut batch = sled::Batch::default();
        for record in records {
            let key = posting_key(&record.term, &record.entity_kind, &record.field, batch_id);
            batch.insert(key, bincode::serialize(record)?);
        }
        self.postings.apply_batch(batch)?;
        Ok(())
    }

    pub(crate) fn apply(&self, batch: sled::Batch) -> Result<()> {
        self.postings.apply_batch(batch)?;
        Ok(())
    }

    /// All current-generation records whose term equals `term`, optionally
    /// filtered by entity kind and field.
    pub fn fetch_term(
        &self,
        term: &str,
        entity_kind: Option<&str>,
        field: Option<&str>,
    ) -> Result<Vec<PostingRecord>> {
        let entries = self.fetch_term_entries(term, entity_kind, field)?;
        Ok(entries.into_iter().map(|(_, record)| record).collect())
    }

    /// Like [`fetch_term`](Self::fetch_term) but keeps the raw tree key of
    /// each record, which the optimizer needs for deletion.
    pub(crate) fn fetch_term_entries(
        &self,
        term: &str,
        entity_kind: Option<&str>,
        field: Option<&str>,
    ) -> Result<Vec<(sled::IVec, PostingRecord)>> {
        let mut prefix = Vec::with_capacity(term.len() + 1);
        prefix.extend_from_slice(term.as_bytes());
        prefix.push(0);
        self.collect_records(self.postings.scan_prefix(prefix), entity_kind, field)
    }

    /// All current-generation records whose term starts with `prefix`.
    pub fn fetch_prefix(
        &self,
        prefix: &str,
        entity_kind: Option<&str>,
        field: Option<&str>,
    ) -> Result<Vec<PostingRecord>> {
        let lower = prefix.as_bytes().to_vec();
        let entries = match byte_successor(prefix.as_bytes()) {
            Some(upper) => {
                self.collect_records(self.postings.range(lower..upper), entity_kind, field)?
            }
            None => self.collect_records(self.postings.range(lower..), entity_kind, field)?,
        };
        Ok(entries.into_iter().map(|(_, record)| record).collect())
    }

    /// All current-generation records whose term lies in the closed range
    /// `lo..=hi`.
    pub fn fetch_term_range(
        &self,
        lo: &str,
        hi: &str,
        entity_kind: Option<&str>,
        field: Option<&str>,
    ) -> Result<Vec<PostingRecord>> {
        let lower = lo.as_bytes().to_vec();
        // Keys for the term `hi` itself start with `hi \0`, which sorts
        // below this bound; terms extending `hi` sort above it.
        let mut upper = hi.as_bytes().to_vec();
        upper.push(0x01);
        let entries = self.collect_records(self.postings.range(lower..upper), entity_kind, field)?;
        Ok(entries.into_iter().map(|(_, record)| record).collect())
    }

    fn collect_records(
        &self,
        iter: sled::Iter,
        entity_kind: Option<&str>,
        field: Option<&str>,
    ) -> Result<Vec<(sled::IVec, PostingRecord)>> {
        let mut out = Vec::new();
        for item in iter {
            let (key, value) = item?;
            let record: PostingRecord = bincode::deserialize(&value)?;
            if record.generation != self.config.generation {
                continue;
            }
            if let Some(kind) = entity_kind {
                if record.entity_kind != kind {
                    continue;
                }
            }
            if let Some(field) = field {
                if record.field != field {
                    continue;
                }
            }
            out.push((key, record));
            if out.len() >= self.config.fetch_limit {
                debug!(limit = self.config.fetch_limit, "posting fetch truncated");
                break;
            }
        }
        Ok(out)
    }
}

pub(crate) fn posting_key(term: &str, kind: &str, field: &str, batch_id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(term.len() + kind.len() + field.len() + 11);
    key.extend_from_slice(term.as_bytes());
    key.push(0);
    key.extend_from_slice(kind.as_bytes());
    key.push(0);
    key.extend_from_slice(field.as_bytes());
    key.push(0);
    key.extend_from_slice(&batch_id.to_be_bytes());
    key
}

/// Smallest byte string sorting after every string that starts with
/// `prefix`, or `None` when no finite bound exists.
fn byte_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(&last) = end.last() {
        if last < 0xff {
            let i = end.len() - 1;
            end[i] = last + 1;
            return Some(end);
        }
        end.pop();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posting_keys_group_by_term() {
        let a = posting_key("alpha", "Artist", "name", 1);
        let b = posting_key("alpha", "Track", "title", 2);
        let c = posting_key("alphabet", "Artist", "name", 1);
        assert!(a.starts_with(b"alpha\0"));
        assert!(b.starts_with(b"alpha\0"));
        assert!(!c.starts_with(b"alpha\0"));
        // A term is never a raw prefix of a longer term's key.
        assert!(a < c);
        assert!(b < c);
    }

    #[test]
    fn byte_successor_increments_and_carries() {
        assert_eq!(Some(b"alphb".to_vec()), byte_successor(b"alpha"));
        assert_eq!(Some(vec![0x62]), byte_successor(&[0x61, 0xff]));
        assert_eq!(None, byte_successor(&[0xff, 0xff]));
        assert_eq!(None, byte_successor(b""));
    }
}
