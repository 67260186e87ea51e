//! Query evaluation: per-term lookups and the set algebra that combines
//! them into a final result.

use crate::posting::{EntityKey, PostingRecord};
use crate::query::{parse_query, MatchKind, QueryTerm, Requirement};
use crate::store::MatchStore;
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// Result of a query: each matching entity key mapped to the set of field
/// names its required terms were found in.
pub type QueryMatches = BTreeMap<EntityKey, BTreeSet<String>>;

fn into_pairs(records: Vec<PostingRecord>) -> HashSet<(EntityKey, String)> {
    let mut pairs = HashSet::new();
    for record in records {
        let PostingRecord { field, matches, .. } = record;
        for key in matches {
            pairs.insert((key, field.clone()));
        }
    }
    pairs
}

/// Find entity keys matching a single normalized search term. Returns
/// (key, matching field) pairs, unioned across every posting record for the
/// term.
pub fn fetch_keys_for_one_term(
    store: &MatchStore,
    term: &str,
    entity_kind: Option<&str>,
    field: Option<&str>,
) -> Result<HashSet<(EntityKey, String)>> {
    Ok(into_pairs(store.fetch_term(term, entity_kind, field)?))
}

/// Find entity keys whose indexed terms start with `prefix`.
pub fn fetch_keys_for_one_prefix(
    store: &MatchStore,
    prefix: &str,
    entity_kind: Option<&str>,
    field: Option<&str>,
) -> Result<HashSet<(EntityKey, String)>> {
    Ok(into_pairs(store.fetch_prefix(prefix, entity_kind, field)?))
}

/// Find entity keys whose indexed terms lie in the closed range `lo..=hi`.
pub fn fetch_keys_for_term_range(
    store: &MatchStore,
    lo: &str,
    hi: &str,
    entity_kind: Option<&str>,
    field: Option<&str>,
) -> Result<HashSet<(EntityKey, String)>> {
    Ok(into_pairs(store.fetch_term_range(lo, hi, entity_kind, field)?))
}

/// Evaluate a whole query string against the index.
///
/// Returns `Ok(None)` for invalid queries: ones that parse to nothing, or
/// that lead with an exclusion and so have nothing to exclude from. A valid
/// query with no matches returns an empty map, which is a different thing.
///
/// Terms are deduplicated and processed required-first. The first required
/// term seeds the running result; later required terms intersect it, with
/// field provenance unioned on the keys that survive; forbidden terms remove
/// their keys outright. Unknown terms contribute empty sets and simply
/// empty the result through intersection.
pub fn fetch_keys_for_query_string(
    store: &MatchStore,
    query_str: &str,
    entity_kind: Option<&str>,
) -> Result<Option<QueryMatches>> {
    let parsed: BTreeSet<QueryTerm> = parse_query(query_str).into_iter().collect();
    if parsed.is_empty() {
        return Ok(None);
    }
    debug!(query = query_str, terms = parsed.len(), "evaluating query");

    let mut all_matches = QueryMatches::new();
    let mut is_first = true;
    for qt in &parsed {
        let field = qt.field.as_deref();
        let these_matches = match (qt.kind, qt.range_end.as_deref()) {
            (_, Some(hi)) => fetch_keys_for_term_range(store, &qt.value, hi, entity_kind, field)?,
            (MatchKind::Exact, None) => {
                fetch_keys_for_one_term(store, &qt.value, entity_kind, field)?
            }
            (MatchKind::Prefix, None) => {
                fetch_keys_for_one_prefix(store, &qt.value, entity_kind, field)?
            }
        };
        match qt.requirement {
            Requirement::Required => {
                let mut grouped = QueryMatches::new();
                for (key, f) in these_matches {
                    grouped.entry(key).or_default().insert(f);
                }
                if is_first {
                    all_matches = grouped;
                } else {
                    let mut retained = QueryMatches::new();
                    for (key, mut fields) in grouped {
                        if let Some(existing) = all_matches.get(&key) {
                            fields.extend(existing.iter().cloned());
                            retained.insert(key, fields);
                        }
                    }
                    all_matches = retained;
                }
            }
            Requirement::Forbidden => {
                // Terms are sorted required-first, so a forbidden term in
                // the lead means the query contains nothing but exclusions.
                if is_first {
                    return Ok(None);
                }
                for (key, _) in these_matches {
                    all_matches.remove(&key);
                }
            }
        }
        is_first = false;
        // Nothing left to narrow or exclude.
        if all_matches.is_empty() {
            break;
        }
    }
    Ok(Some(all_matches))
}
