use crate::posting::{EntityKey, PostingRecord};
use crate::store::MatchStore;
use crate::text::tokenize;
use anyhow::Result;
use std::collections::HashMap;
use time::OffsetDateTime;
use tracing::debug;

/// Capability for anything the indexer can consume: a key plus the
/// (field name, text) pairs worth indexing. New entity kinds plug in by
/// implementing this, no indexer changes needed.
pub trait Indexable {
    fn key(&self) -> &EntityKey;
    fn indexable_fields(&self) -> Vec<(String, String)>;
}

/// Builds a searchable index of text associated with entities.
///
/// Postings accumulate in memory across `add_*` calls, one pending record
/// per (kind, field, term), and flush to the store in a single atomic batch
/// on [`save`](Self::save). Each indexer writes under its own batch id, so
/// concurrent indexers append disjoint records rather than conflicting.
pub struct Indexer<'a> {
    store: &'a MatchStore,
    batch_id: u64,
    pending: HashMap<(String, String, String), PostingRecord>,
}

impl<'a> Indexer<'a> {
    pub fn new(store: &'a MatchStore) -> Result<Self> {
        Ok(Self {
            store,
            batch_id: store.next_batch_id()?,
            pending: HashMap::new(),
        })
    }

    /// Batch id stamped into every posting key this indexer writes. Callers
    /// persisting entities alongside their index data can reuse it to tag
    /// both writes with the same logical transaction.
    pub fn batch_id(&self) -> u64 {
        self.batch_id
    }

    /// Queue up index postings for text associated with an entity key.
    /// Adding the same key and text twice is a no-op; matches are sets.
    pub fn add_key(&mut self, key: &EntityKey, field: &str, text: &str) {
        let generation = self.store.config().generation;
        for term in tokenize(text) {
            let record = self
                .pending
                .entry((key.kind().to_owned(), field.to_owned(), term.clone()))
                .or_insert_with(|| PostingRecord::new(generation, key.kind(), field, &term));
            record.matches.insert(key.clone());
        }
    }

    /// Queue up postings for every indexable field of an entity.
    pub fn add_entity(&mut self, entity: &impl Indexable) {
        for (field, text) in entity.indexable_fields() {
            self.add_key(entity.key(), &field, &text);
        }
    }

    pub fn add_artist(&mut self, artist: &crate::entity::Artist) {
        self.add_entity(artist);
    }

    pub fn add_album(&mut self, album: &crate::entity::Album) {
        self.add_entity(album);
    }

    pub fn add_track(&mut self, track: &crate::entity::Track) {
        self.add_entity(track);
    }

    /// Write all pending postings to the store in one atomic batch and
    /// clear the cache. Calling this with nothing pending is a no-op, so it
    /// is safe to call repeatedly.
    pub fn save(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let now = OffsetDateTime::now_utc();
        let records: Vec<PostingRecord> = self
            .pending
            .drain()
            .map(|(_, mut record)| {
                record.timestamp = now;
                record
            })
            .collect();
        self.store.put_records(&records, self.batch_id)?;
        debug!(
            postings = records.len(),
            batch_id = self.batch_id,
            "flushed index postings"
        );
        Ok(())
    }
}
