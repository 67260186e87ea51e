//! Inverted-index text search for a music library catalog.
//!
//! The index lives in a sled key/value store as posting records: one record
//! maps a normalized term to the set of entity keys whose text contains it,
//! per entity kind and field. Writers batch postings through an [`Indexer`],
//! queries run through [`fetch_keys_for_query_string`], and the redundant
//! records that separate write batches leave behind are folded together by
//! [`optimize_index`].
//!
//! Matches are unordered sets; there is no relevance scoring, fuzzy
//! matching or stemming, just normalization, required/forbidden term
//! algebra and prefix ranges.

pub mod entity;
pub mod indexer;
pub mod optimize;
pub mod posting;
pub mod query;
pub mod results;
pub mod search;
pub mod store;
pub mod text;

pub use entity::{Album, Artist, Track};
pub use indexer::{Indexable, Indexer};
pub use optimize::optimize_index;
pub use posting::{EntityKey, IndexConfig, IndexMeta, PostingRecord};
pub use query::{parse_query, MatchKind, QueryTerm, Requirement};
pub use results::{discard_items, enforce_results_limit, segment_keys_by_kind};
pub use search::{
    fetch_keys_for_one_prefix, fetch_keys_for_one_term, fetch_keys_for_query_string,
    fetch_keys_for_term_range, QueryMatches,
};
pub use store::MatchStore;
