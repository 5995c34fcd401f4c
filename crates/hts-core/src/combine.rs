//! Concatenation of per-list extraction tables.

use std::collections::BTreeMap;

use hts_model::{HtsCode, ListEntry};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct CombinedLists {
    /// All entries sorted by (code text, list label).
    pub entries: Vec<ListEntry>,
    /// Canonical codes that occur more than once.
    pub duplicate_codes: Vec<HtsCode>,
    /// Entries that share a code with another entry.
    pub duplicate_entries: usize,
    /// List label to entry count.
    pub per_list: BTreeMap<String, usize>,
}

pub fn combine_lists<I>(tables: I) -> CombinedLists
where
    I: IntoIterator<Item = Vec<ListEntry>>,
{
    let mut entries: Vec<ListEntry> = tables.into_iter().flatten().collect();
    entries.sort_by(|a, b| {
        a.raw_code
            .cmp(&b.raw_code)
            .then_with(|| a.list.label().cmp(b.list.label()))
    });

    let mut occurrences: BTreeMap<&HtsCode, usize> = BTreeMap::new();
    let mut per_list = BTreeMap::new();
    for entry in &entries {
        *occurrences.entry(&entry.code).or_insert(0) += 1;
        *per_list.entry(entry.list.label().to_string()).or_insert(0) += 1;
    }
    let duplicates: Vec<(&HtsCode, usize)> = occurrences
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .collect();
    let duplicate_entries = duplicates.iter().map(|(_, count)| count).sum();
    let duplicate_codes: Vec<HtsCode> = duplicates
        .into_iter()
        .map(|(code, _)| code.clone())
        .collect();

    if !duplicate_codes.is_empty() {
        let sample: Vec<&str> = duplicate_codes.iter().take(5).map(HtsCode::as_str).collect();
        warn!(
            duplicate_entries,
            duplicate_codes = duplicate_codes.len(),
            sample = ?sample,
            "codes appear on more than one list"
        );
    }
    info!(entries = entries.len(), lists = per_list.len(), "combined list tables");

    CombinedLists {
        entries,
        duplicate_codes,
        duplicate_entries,
        per_list,
    }
}
