use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Matches interior periods, i.e. the dots in "L.A."
    static ref INTERIOR_PERIODS_RE: Regex = Regex::new(r"(\S)\.(\S)").expect("valid regex");
    static ref TAGS_RE: Regex = Regex::new(r"\[[^\]]+\]").expect("valid regex");
    static ref STOP_WORDS: HashSet<&'static str> = {
        let words: &[&str] = &["and", "in", "is", "it", "my", "of", "the", "to"];
        words.iter().copied().collect()
    };
    // Folds for characters whose NFD decomposition does not reach the
    // plain letter we want to index under.
    static ref CHAR_FOLDS: HashMap<char, char> = {
        let pairs: &[(char, char)] = &[('\u{f8}', 'o')];
        pairs.iter().copied().collect()
    };
}

/// True for terms that are never indexed: stop words and anything a single
/// character long.
pub fn is_stop_word(term: &str) -> bool {
    term.chars().count() <= 1 || STOP_WORDS.contains(term)
}

/// Normalize a piece of text for indexing and searching.
///
/// Interior periods collapse first ("L.A." becomes "LA "). Every remaining
/// character is lowercased; letters and digits keep only their NFD base
/// character (stripping diacritics, with a small fold table for characters
/// NFD cannot reduce), apostrophes vanish entirely ("foo's" becomes "foos")
/// and anything else turns into a single space. Whitespace runs are left
/// alone here; tokenization splits them away.
pub fn normalize(text: &str) -> String {
    let text = INTERIOR_PERIODS_RE.replace_all(text, "${1}${2}");
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        for lc in c.to_lowercase() {
            if lc.is_alphanumeric() {
                let base = std::iter::once(lc).nfd().next().unwrap_or(lc);
                out.push(CHAR_FOLDS.get(&base).copied().unwrap_or(base));
            } else if lc == '\'' {
                // dropped, so "foo's" indexes as "foos"
            } else {
                out.push(' ');
            }
        }
    }
    out
}

/// Split text into a normalized list of index-worthy terms, discarding stop
/// words and single-character tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .filter(|term| !is_stop_word(term))
        .map(str::to_owned)
        .collect()
}

/// Remove inventory tags from a title. A tag is a chunk of text enclosed in
/// square brackets, [like this].
pub fn strip_tags(text: &str) -> String {
    TAGS_RE.replace_all(text, "").into_owned()
}
