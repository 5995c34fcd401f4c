//! HTS revision label from change-record text.

use std::sync::LazyLock;

use regex::Regex;

/// Recognized phrasings, most specific first.
static REVISION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)HTS\s+\d{4}\s+Revision\s+(\d+)",
        r"(?i)\d{4}\s+HTS\s+Revision\s+(\d+)",
        r"(?i)Revision\s+(\d+)\s+to\s+the\s+\d{4}\s+HTS",
        r"(?i)HTS\s+Revision\s+(\d+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid revision regex"))
    .collect()
});

/// Extract `Revision N` from text such as "HTS 2025 Revision 11".
pub fn extract_revision(text: &str) -> Option<String> {
    REVISION_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|captures| captures.get(1))
            .map(|number| format!("Revision {}", number.as_str()))
    })
}
