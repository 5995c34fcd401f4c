//! Section 301 lookup keyed by canonical code.

use std::collections::BTreeMap;

use hts_model::{HtsCode, ListEntry, Section301List, controlling_entries};

/// Controlling list for one code.
#[derive(Debug, Clone, PartialEq)]
pub struct Section301Entry {
    pub list: Section301List,
    pub rate: f64,
    pub description: String,
    pub original_code: String,
}

#[derive(Debug, Clone, Default)]
pub struct Section301Table {
    entries: BTreeMap<HtsCode, Section301Entry>,
}

impl Section301Table {
    /// Build the lookup; codes listed more than once resolve to the latest list.
    pub fn from_entries(entries: Vec<ListEntry>) -> Self {
        let entries = controlling_entries(entries)
            .into_iter()
            .map(|entry| {
                let value = Section301Entry {
                    rate: entry.list.rate(),
                    list: entry.list,
                    description: entry.description,
                    original_code: entry.raw_code,
                };
                (entry.code, value)
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, code: &HtsCode) -> Option<&Section301Entry> {
        self.entries.get(code)
    }

    pub fn contains(&self, code: &HtsCode) -> bool {
        self.entries.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of codes per controlling list label.
    pub fn list_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.entries.values() {
            *counts.entry(entry.list.label().to_string()).or_insert(0) += 1;
        }
        counts
    }
}
