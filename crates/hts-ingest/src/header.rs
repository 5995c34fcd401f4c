//! Header and cell cleanup shared by the table readers.

/// Normalize a base-schedule header to snake case: BOM and surrounding
/// whitespace removed, lower-cased, runs of spaces and hyphens become `_`.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim_matches('\u{feff}').trim();
    let mut normalized = String::with_capacity(trimmed.len());
    let mut pending_separator = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = true;
            continue;
        }
        if pending_separator && !normalized.is_empty() {
            normalized.push('_');
        }
        pending_separator = false;
        normalized.extend(ch.to_lowercase());
    }
    normalized
}

/// Trimmed cell without BOM; `None` when nothing is left.
pub fn clean_cell(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_matches('\u{feff}').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// List-table headers keep their case; only BOM and whitespace are removed.
pub(crate) fn trim_header(raw: &str) -> &str {
    raw.trim_matches('\u{feff}').trim()
}
