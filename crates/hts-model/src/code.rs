//! HTS code normalization.
//!
//! Source documents spell the same classification in several ways
//! (`2845.90.00`, `28459000`, `0101.21.00`, ten-digit statistical suffixes).
//! Every lookup in the pipeline compares [`HtsCode`] keys, so every source
//! passes through the same [`HtsCode::normalize`] function.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

/// Width of a canonical comparison key.
pub const CODE_WIDTH: usize = 8;

/// Canonical 8-digit HTS comparison key.
///
/// Equality, ordering and hashing use the normalized key only. The source
/// digits are kept beside it (fixed to [`CODE_WIDTH`], leading zeros intact)
/// so chapter and prefix predicates see the code as written: `0302.11.00`
/// is chapter `03` even though its key is `30211000`.
#[derive(Debug, Clone)]
pub struct HtsCode {
    key: String,
    source: String,
}

impl HtsCode {
    /// Normalize any textual code into the fixed-width key.
    ///
    /// Leading zeros are stripped before padding, so chapter 01-09 codes
    /// shift left by one digit (`0101.21.00` becomes `10121000`). The
    /// result never starts with `0` except for the all-zero key, which makes
    /// the function idempotent. Input without digits degrades to `00000000`.
    pub fn normalize(raw: &str) -> Self {
        let digits = digits_only(raw);
        let stripped = digits.trim_start_matches('0');
        let mut key = if stripped.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        };
        fit_width(&mut key);
        // Realign chapter-prefixed codes whose leading zero was re-padded.
        if key.starts_with('0') {
            key.remove(0);
            key.push('0');
        }
        let mut source = digits;
        fit_width(&mut source);
        Self { key, source }
    }

    /// Like [`HtsCode::normalize`], but `None` when the text carries no digits.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.chars().any(|ch| ch.is_ascii_digit()) {
            Some(Self::normalize(raw))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Source digits, right-padded or truncated to [`CODE_WIDTH`].
    pub fn source_digits(&self) -> &str {
        &self.source
    }

    /// First two source digits.
    pub fn chapter(&self) -> &str {
        &self.source[..2]
    }

    /// True when the source digits start with the digits of `prefix`
    /// (separators ignored).
    pub fn has_prefix(&self, prefix: &str) -> bool {
        let digits = digits_only(prefix);
        !digits.is_empty() && self.source.starts_with(&digits)
    }

    pub fn is_chapter_99(&self) -> bool {
        self.source.starts_with("99")
    }
}

fn fit_width(digits: &mut String) {
    if digits.len() < CODE_WIDTH {
        digits.extend(std::iter::repeat_n('0', CODE_WIDTH - digits.len()));
    } else {
        digits.truncate(CODE_WIDTH);
    }
}

impl PartialEq for HtsCode {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for HtsCode {}

impl PartialOrd for HtsCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HtsCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Hash for HtsCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl Serialize for HtsCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key)
    }
}

impl fmt::Display for HtsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Keep only ASCII digits, dropping separators and byte-order marks.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_code_is_compacted() {
        assert_eq!(HtsCode::normalize("2845.90.00").as_str(), "28459000");
    }

    #[test]
    fn short_codes_are_right_padded() {
        assert_eq!(HtsCode::normalize("8541.42").as_str(), "85414200");
    }

    #[test]
    fn long_codes_are_truncated() {
        assert_eq!(HtsCode::normalize("8541.42.00.10").as_str(), "85414200");
    }

    #[test]
    fn leading_zero_chapters_shift_left() {
        assert_eq!(HtsCode::normalize("0101.21.00").as_str(), "10121000");
        assert_eq!(HtsCode::normalize("01012100").as_str(), "10121000");
    }

    #[test]
    fn garbage_degrades_to_zero_key() {
        assert_eq!(HtsCode::normalize("n/a").as_str(), "00000000");
        assert_eq!(HtsCode::normalize("").as_str(), "00000000");
        assert_eq!(HtsCode::normalize("0000").as_str(), "00000000");
        assert!(HtsCode::parse("n/a").is_none());
    }

    #[test]
    fn prefix_ignores_separators() {
        let code = HtsCode::normalize("8541.42.00");
        assert!(code.has_prefix("8541.42"));
        assert!(code.has_prefix("85"));
        assert!(!code.has_prefix("8542"));
        assert!(!code.has_prefix(""));
        assert_eq!(code.chapter(), "85");
    }

    #[test]
    fn predicates_use_source_digits() {
        let fish = HtsCode::normalize("0302.11.00");
        assert_eq!(fish.as_str(), "30211000");
        assert_eq!(fish.source_digits(), "03021100");
        assert_eq!(fish.chapter(), "03");
        assert!(fish.has_prefix("0302"));
        assert!(!fish.has_prefix("3021"));

        let coffee = HtsCode::normalize("0901.90.10");
        assert!(!coffee.has_prefix("9019"));
        assert_eq!(coffee, HtsCode::normalize("90190100"));
    }

    #[test]
    fn serializes_as_key() {
        let code = HtsCode::normalize("0101.21.00");
        assert_eq!(serde_json::to_string(&code).expect("serialize"), "\"10121000\"");
    }
}
