//! Index compaction. Every save batch appends fresh posting records, so
//! over time one (kind, field, term) tuple spreads across many records.
//! This job folds them back into one.

use crate::posting::PostingRecord;
use crate::store::{posting_key, MatchStore};
use crate::text::is_stop_word;
use anyhow::Result;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tracing::info;

/// Optimize the index for one normalized term.
///
/// Every current-generation record for the term is grouped by entity kind
/// and field; groups holding more than one record are merged into a single
/// consolidated record whose matches are the union of the group's. The
/// merged insert and the deletions ride one atomic batch, so no match can
/// be lost partway.
///
/// If the term is a stop word, every record found is deleted and nothing is
/// recreated. Stop words should never remain indexed; this cleans up data
/// left behind when the stop-word list grows.
///
/// Returns the net decrease in the number of posting records.
pub fn optimize_index(store: &MatchStore, term: &str) -> Result<usize> {
    let entries = store.fetch_term_entries(term, None, None)?;
    let mut segmented: BTreeMap<(String, String), Vec<(sled::IVec, PostingRecord)>> =
        BTreeMap::new();
    for (key, record) in entries {
        segmented
            .entry((record.entity_kind.clone(), record.field.clone()))
            .or_default()
            .push((key, record));
    }

    if is_stop_word(term) {
        let mut batch = sled::Batch::default();
        let mut num_deleted = 0;
        for subset in segmented.values() {
            for (key, _) in subset {
                batch.remove(key.clone());
                num_deleted += 1;
            }
        }
        if num_deleted > 0 {
            store.apply(batch)?;
            info!(term, num_deleted, "purged stop-word postings");
        }
        return Ok(num_deleted);
    }

    let mut batch = sled::Batch::default();
    let mut num_deleted = 0;
    for ((kind, field), subset) in &segmented {
        if subset.len() < 2 {
            continue;
        }
        let mut merged = PostingRecord::new(store.config().generation, kind, field, term);
        for (_, record) in subset {
            merged.matches.extend(record.matches.iter().cloned());
        }
        merged.timestamp = OffsetDateTime::now_utc();
        batch.insert(
            posting_key(term, kind, field, store.next_batch_id()?),
            bincode::serialize(&merged)?,
        );
        for (key, _) in subset {
            batch.remove(key.clone());
        }
        num_deleted += subset.len() - 1;
    }
    if num_deleted > 0 {
        store.apply(batch)?;
        info!(term, num_deleted, "merged posting records");
    }
    Ok(num_deleted)
}
