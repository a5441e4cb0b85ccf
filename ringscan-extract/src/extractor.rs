//! Pattern matching over raw page text.
//!
//! A phone token is an optional `+7`, `7` or `8` prefix, an optional
//! whitespace, an optionally parenthesised 3-digit code, then 3, 2 and 2
//! digits, each group optionally separated by whitespace or a hyphen. The
//! whole token sits between word boundaries.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::RawMatch;

pub const PHONE_PATTERN: &str =
    r"\b(?:\+7|7|8)?\s?\(?\d{3}\)?[\s-]?\d{3}[\s-]?\d{2}[\s-]?\d{2}\b";

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern is a valid regex"));

/// Iterate over every non-overlapping match in document order.
///
/// Duplicates are kept; use [`extract`] for set semantics.
pub fn extract_iter(text: &str) -> impl Iterator<Item = &str> {
    PHONE_REGEX.find_iter(text).map(|m| m.as_str())
}

/// Collect the distinct phone-like substrings of `text`.
///
/// Equality is exact: `8 916 123 45 67` and `8(916)123-45-67` are two
/// different raw matches. An empty set means nothing matched.
pub fn extract(text: &str) -> BTreeSet<RawMatch> {
    extract_iter(text).map(RawMatch::new).collect()
}
