//! FILENAME: core/table-engine/src/fuzzy.rs
//! Fuzzy relevance ranking for fuzzy column filters and the global search.
//!
//! A candidate string is ranked against the query; the filter keeps a row
//! when the rank reaches the configured threshold. Ranks, best first:
//!
//! - `CaseSensitiveEqual`: identical strings
//! - `Equal`: identical ignoring case
//! - `StartsWith`: candidate starts with the query
//! - `WordStartsWith`: some word of the candidate starts with the query
//! - `Contains`: query is a substring of the candidate
//! - `Acronym`: query is a substring of the candidate's word initials
//! - `Matches`: every query character appears in order (subsequence)
//! - `NoMatch`

use serde::{Deserialize, Serialize};

/// How well a candidate matches a query. Ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchRank {
    NoMatch,
    Matches,
    Acronym,
    Contains,
    WordStartsWith,
    StartsWith,
    Equal,
    CaseSensitiveEqual,
}

impl Default for MatchRank {
    fn default() -> Self {
        MatchRank::Matches
    }
}

/// Ranks `candidate` against `query`.
pub fn rank(query: &str, candidate: &str) -> MatchRank {
    if query.chars().count() > candidate.chars().count() {
        return MatchRank::NoMatch;
    }
    if query == candidate {
        return MatchRank::CaseSensitiveEqual;
    }

    let query = query.to_lowercase();
    let candidate = candidate.to_lowercase();

    if query == candidate {
        return MatchRank::Equal;
    }
    if candidate.starts_with(&query) {
        return MatchRank::StartsWith;
    }
    if starts_any_word(&candidate, &query) {
        return MatchRank::WordStartsWith;
    }
    if candidate.contains(&query) {
        return MatchRank::Contains;
    }
    if query.chars().count() == 1 {
        // A single character that is not contained cannot match.
        return MatchRank::NoMatch;
    }
    if acronym(&candidate).contains(&query) {
        return MatchRank::Acronym;
    }
    if is_subsequence(&query, &candidate) {
        return MatchRank::Matches;
    }
    MatchRank::NoMatch
}

/// Returns true if `candidate` ranks at or above `threshold`. An empty query
/// matches everything.
pub fn is_match(query: &str, candidate: &str, threshold: MatchRank) -> bool {
    if query.is_empty() {
        return true;
    }
    let rank = rank(query, candidate);
    rank != MatchRank::NoMatch && rank >= threshold
}

fn is_word_separator(c: char) -> bool {
    c.is_whitespace() || c == '-' || c == '_'
}

fn starts_any_word(candidate: &str, query: &str) -> bool {
    candidate
        .split(is_word_separator)
        .skip(1)
        .any(|word| word.starts_with(query))
}

fn acronym(candidate: &str) -> String {
    candidate
        .split(is_word_separator)
        .filter_map(|word| word.chars().next())
        .collect()
}

fn is_subsequence(query: &str, candidate: &str) -> bool {
    let mut remaining = candidate.chars();
    query.chars().all(|q| remaining.any(|c| c == q))
}
