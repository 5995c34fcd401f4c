//! Code/description runs from list text produced by an external PDF extractor.

use std::collections::HashSet;
use std::sync::LazyLock;

use hts_model::{ListEntry, Section301List};
use regex::Regex;

/// A dotted 8-digit HTS code as printed in the lists (`2845.90.00`).
static LIST_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}\.\d{2}\.\d{2}").expect("Invalid list code regex"));

/// Split text into `(code, description)` pairs.
///
/// Whitespace is collapsed first; each description runs from its code to
/// the next code. Pairs with an empty description and exact repeats are
/// dropped, first occurrence order is kept.
pub fn extract_list_entries(text: &str, list: &Section301List) -> Vec<ListEntry> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let codes: Vec<_> = LIST_CODE_REGEX.find_iter(&collapsed).collect();

    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for (idx, code) in codes.iter().enumerate() {
        let end = codes
            .get(idx + 1)
            .map_or(collapsed.len(), regex::Match::start);
        let description = collapsed[code.end()..end].trim();
        if description.is_empty() {
            continue;
        }
        if seen.insert((code.as_str(), description)) {
            entries.push(ListEntry::new(code.as_str(), description, list.clone()));
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_runs_between_codes() {
        let text = "Annex 2845.90.00 Heavy water\n(deuterium oxide)   2845.90.00 Heavy water (deuterium oxide)\
                    8411.11.40 Turbojets\n 8411.11.80 ";
        let entries = extract_list_entries(text, &Section301List::List1);
        let pairs: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.raw_code.as_str(), e.description.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("2845.90.00", "Heavy water (deuterium oxide)"),
                ("8411.11.40", "Turbojets"),
            ]
        );
        assert!(entries.iter().all(|e| e.list == Section301List::List1));
    }

    #[test]
    fn text_without_codes_yields_nothing() {
        assert!(extract_list_entries("no codes here", &Section301List::List3).is_empty());
    }
}
