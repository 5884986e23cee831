//! Text canonicalization for categorical and street columns.

use regex::Regex;
use std::sync::LazyLock;

/// Line break between the street and the trailing city/state/zip lines.
static LINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n").expect("valid regex"));

/// Junction marker joining two streets ("WASHINGTON ST & ESSEX ST").
static JUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new("&").expect("valid regex"));

/// Title-cases `s`: a letter is uppercased when the character before it is
/// not a letter, and lowercased otherwise.
///
/// Digits and punctuation start a new word, so `"1ST ST"` becomes
/// `"1St St"` and `"O'NEIL"` becomes `"O'Neil"`. Applying it twice gives
/// the same result as applying it once.
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Keeps the street portion of a multi-line location string.
#[must_use]
pub fn canonical_street(raw: &str) -> &str {
    LINE_BREAK_RE.split(raw).next().unwrap_or(raw)
}

/// Returns `true` if the street names a junction of two streets.
#[must_use]
pub fn is_intersection(street: &str) -> bool {
    JUNCTION_RE.is_match(street)
}
