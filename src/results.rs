//! Helpers for shaping a query's key set into displayable results.

use crate::posting::EntityKey;
use std::collections::BTreeMap;

// Kinds in the order their results are discarded when a limit bites.
// Tracks go first, artists last.
const DISCARD_ORDER: &[&str] = &["Track", "Album", "Artist"];

/// Group a flat sequence of entity keys by kind. Resolving keys into
/// entities is left to the caller.
pub fn segment_keys_by_kind(
    keys: impl IntoIterator<Item = EntityKey>,
) -> BTreeMap<String, Vec<EntityKey>> {
    let mut segmented: BTreeMap<String, Vec<EntityKey>> = BTreeMap::new();
    for key in keys {
        segmented.entry(key.kind().to_owned()).or_default().push(key);
    }
    segmented
}

/// Drop up to `count` items from the end of the list, returning how many
/// actually came off.
pub fn discard_items<T>(items: &mut Vec<T>, count: usize) -> usize {
    let n = count.min(items.len());
    items.truncate(items.len() - n);
    n
}

/// Trim segmented matches down to at most `max_num_results` keys in total,
/// discarding whole kinds in a fixed order and removing kinds whose lists
/// empty out. `None` means no limit.
pub fn enforce_results_limit<T>(
    matches: &mut BTreeMap<String, Vec<T>>,
    max_num_results: Option<usize>,
) {
    let max = match max_num_results {
        Some(max) => max,
        None => return,
    };
    let mut total: usize = matches.values().map(Vec::len).sum();
    for kind in DISCARD_ORDER {
        if total <= max {
            break;
        }
        if let Some(items) = matches.get_mut(*kind) {
            total -= discard_items(items, total - max);
            if items.is_empty() {
                matches.remove(*kind);
            }
        }
    }
}
