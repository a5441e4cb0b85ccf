//! Rewriting raw matches into `8KKKNNNNNNN`.
//!
//! Digits are kept, everything else dropped, then by digit count:
//! 10 digits get a leading `8`, 7 digits get the Moscow prefix `8495`, and
//! anything else has a leading `7` replaced by `8`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::NormalizedNumber;

pub(crate) const CANONICAL_LEN: usize = 11;
pub(crate) const TRUNK_PREFIX: char = '8';
const COUNTRY_CODE: char = '7';
const NATIONAL_LEN: usize = 10;
const LOCAL_LEN: usize = 7;
const MOSCOW_PREFIX: &str = "8495";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("invalid phone format: '{raw}' has {} digits", .digits.len())]
    InvalidPhoneFormat { raw: String, digits: String },
}

/// How to treat matches whose digits do not form a canonical number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizePolicy {
    /// Reject anything that would not come out as 11 digits starting with `8`.
    #[default]
    Strict,
    /// Apply the rewrite rules to any length and keep whatever comes out.
    Permissive,
}

/// Normalize a raw match, accepting any digit count.
///
/// ```
/// use ringscan_extract::normalize;
///
/// assert_eq!(normalize("9161234567").as_str(), "89161234567");
/// assert_eq!(normalize("1234567").as_str(), "84951234567");
/// assert_eq!(normalize("+7 916 123-45-67").as_str(), "89161234567");
/// assert_eq!(normalize("8 (916) 123-45-67").as_str(), "89161234567");
/// ```
///
/// Lengths other than 7, 10 and 11 fall through to the prefix rewrite and may
/// produce a value for which [`NormalizedNumber::is_canonical`] is false.
pub fn normalize(raw: &str) -> NormalizedNumber {
    NormalizedNumber::from_digits(rewrite(ascii_digits(raw)))
}

/// Normalize a raw match, failing unless the result is canonical.
pub fn normalize_strict(raw: &str) -> Result<NormalizedNumber, PhoneError> {
    let digits = ascii_digits(raw);
    let accepted = match digits.len() {
        LOCAL_LEN | NATIONAL_LEN => true,
        CANONICAL_LEN => digits.starts_with([COUNTRY_CODE, TRUNK_PREFIX]),
        _ => false,
    };
    if !accepted {
        return Err(PhoneError::InvalidPhoneFormat {
            raw: raw.to_string(),
            digits,
        });
    }
    Ok(NormalizedNumber::from_digits(rewrite(digits)))
}

pub fn normalize_with(
    policy: NormalizePolicy,
    raw: &str,
) -> Result<NormalizedNumber, PhoneError> {
    match policy {
        NormalizePolicy::Strict => normalize_strict(raw),
        NormalizePolicy::Permissive => Ok(normalize(raw)),
    }
}

fn ascii_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

fn rewrite(mut digits: String) -> String {
    match digits.len() {
        NATIONAL_LEN => digits.insert(0, TRUNK_PREFIX),
        LOCAL_LEN => digits.insert_str(0, MOSCOW_PREFIX),
        _ => {
            if digits.starts_with(COUNTRY_CODE) {
                digits.remove(0);
                digits.insert(0, TRUNK_PREFIX);
            }
        }
    }
    digits
}
