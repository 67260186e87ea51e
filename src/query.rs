//! Query-string parsing.
//!
//! The query language is small:
//!   * `foo bar` finds entities whose text contains both terms.
//!   * `-foo` excludes entities whose text contains the term.
//!   * `foo*` matches any term starting with the prefix.
//!   * `label:rec*` restricts a term to one indexed field.
//!   * `year:2000-2011` matches any term in a closed range, within a field.

use crate::text::{is_stop_word, normalize};

/// Whether a term must or must not match for an entity to be returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Requirement {
    Required,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchKind {
    Exact,
    Prefix,
}

/// One parsed unit of a search query.
///
/// The derived ordering sorts every `Required` term before any `Forbidden`
/// one, which is exactly the processing order the evaluator needs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryTerm {
    pub requirement: Requirement,
    pub kind: MatchKind,
    pub value: String,
    /// Restricts the lookup to one indexed field, as in `year:2011`.
    pub field: Option<String>,
    /// Upper bound of a closed term range, as in `year:2000-2011`.
    pub range_end: Option<String>,
}

/// Convert a query string into a sequence of query terms.
///
/// The string splits on whitespace into chunks and each chunk runs through
/// a small state machine: a leading `-` run marks the chunk forbidden, a
/// trailing `*` run marks it a prefix, and text before a `:` names a field.
/// Normalizing the remainder may explode it into several sub-terms (most
/// punctuation folds to a space). Only the first sub-term of a forbidden
/// chunk is forbidden, and only the last sub-term of a prefix chunk is a
/// prefix; the others revert to plain required terms.
///
/// Exact sub-terms that are stop words contribute nothing, since stop words
/// never exist in the index. Prefix sub-terms are kept even when they are
/// stop words so that autocomplete on short common words still works.
pub fn parse_query(query_str: &str) -> Vec<QueryTerm> {
    let mut query = Vec::new();
    for chunk in query_str.split_whitespace() {
        parse_chunk(chunk, &mut query);
    }
    query
}

fn parse_chunk(chunk: &str, out: &mut Vec<QueryTerm>) {
    let trimmed = chunk.trim_start_matches('-');
    let forbidden = trimmed.len() != chunk.len();
    let rest = trimmed.trim_end_matches('*');
    let prefix = rest.len() != trimmed.len();

    let (field, value) = match rest.split_once(':') {
        Some((name, value)) => (first_token(name), value),
        None => (None, rest),
    };

    // Inside a field scope an interior dash separates the two ends of a
    // closed term range. Bare chunks like "foo-bar" never form ranges; the
    // dash folds to whitespace during normalization instead.
    if field.is_some() {
        if let Some((lo, hi)) = value.split_once('-') {
            if let (Some(lo), Some(hi)) = (first_token(lo), first_token(hi)) {
                out.push(QueryTerm {
                    requirement: requirement_for(forbidden, 0),
                    kind: MatchKind::Exact,
                    value: lo,
                    field,
                    range_end: Some(hi),
                });
            }
            return;
        }
    }

    let subterms: Vec<String> = normalize(value)
        .split_whitespace()
        .map(str::to_owned)
        .collect();
    let last = subterms.len().saturating_sub(1);
    for (i, sub) in subterms.into_iter().enumerate() {
        let kind = if i == last && prefix {
            MatchKind::Prefix
        } else {
            MatchKind::Exact
        };
        if kind == MatchKind::Exact && is_stop_word(&sub) {
            continue;
        }
        out.push(QueryTerm {
            requirement: requirement_for(forbidden, i),
            kind,
            value: sub,
            field: field.clone(),
            range_end: None,
        });
    }
}

fn requirement_for(forbidden: bool, subterm_index: usize) -> Requirement {
    if forbidden && subterm_index == 0 {
        Requirement::Forbidden
    } else {
        Requirement::Required
    }
}

fn first_token(text: &str) -> Option<String> {
    normalize(text).split_whitespace().next().map(str::to_owned)
}
