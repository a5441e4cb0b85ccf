//! Phone number extraction from raw page text.
//!
//! - [`extractor`]: finds phone-like substrings with a single regular expression
//! - [`normalizer`]: rewrites a match into the canonical `8XXXXXXXXXX` form
//!
//! No DOM is built; the pattern runs over the raw HTML. [`phones_in`] glues
//! the two halves together and is what the scanner calls per page.
//!
//! ```rust
//! use ringscan_extract::{NormalizePolicy, phones_in};
//!
//! let html = "<p>8 916 123 45 67</p><p>+7(916)123-45-67</p>";
//! let page = phones_in(html, NormalizePolicy::Strict);
//! assert_eq!(page.phones.len(), 1);
//! assert_eq!(page.phones.iter().next().unwrap().as_str(), "89161234567");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub mod extractor;
pub mod normalizer;

pub use extractor::{extract, extract_iter};
pub use normalizer::{NormalizePolicy, PhoneError, normalize, normalize_strict, normalize_with};

/// A substring of page text that matched the phone pattern, untouched.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMatch(String);

impl RawMatch {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for RawMatch {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RawMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digit-only national form of a phone number, e.g. `89161234567`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedNumber(String);

impl NormalizedNumber {
    pub(crate) fn from_digits(digits: String) -> Self {
        Self(digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the value is exactly 11 ASCII digits starting with `8`.
    pub fn is_canonical(&self) -> bool {
        self.0.len() == normalizer::CANONICAL_LEN
            && self.0.starts_with(normalizer::TRUNK_PREFIX)
            && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl AsRef<str> for NormalizedNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Phones found on a single page after normalization and deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePhones {
    pub phones: BTreeSet<NormalizedNumber>,
    /// Raw matches the strict policy refused to normalize.
    pub rejected: Vec<RawMatch>,
}

/// Extract, normalize and deduplicate every phone number in `text`.
///
/// Two raw matches that differ only in punctuation collapse into one
/// number. Under [`NormalizePolicy::Strict`] malformed matches are collected
/// in [`PagePhones::rejected`] instead of the result set.
pub fn phones_in(text: &str, policy: NormalizePolicy) -> PagePhones {
    let mut page = PagePhones::default();
    for raw in extract(text) {
        match normalize_with(policy, raw.as_str()) {
            Ok(number) => {
                page.phones.insert(number);
            }
            Err(err) => {
                tracing::debug!(raw = %raw, error = %err, "extract.phone.rejected");
                page.rejected.push(raw);
            }
        }
    }
    tracing::trace!(
        phones = page.phones.len(),
        rejected = page.rejected.len(),
        "extract.page.done"
    );
    page
}
