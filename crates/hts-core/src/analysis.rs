//! Codes listed on more than one Section 301 list.

use std::collections::BTreeMap;

use hts_model::{HtsCode, ListEntry, Section301List};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateCode {
    pub code: HtsCode,
    pub raw_code: String,
    /// Lists in chronological order, one per occurrence.
    pub lists: Vec<String>,
    /// Tariff tier of each list (`25%`, `7.5%`, `Unknown`).
    pub tiers: Vec<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DuplicateAnalysis {
    /// Sorted by occurrence count (descending), then code.
    pub codes: Vec<DuplicateCode>,
    /// List combination (`1, 4a`) to number of codes, most frequent first.
    pub combinations: Vec<(String, usize)>,
}

pub fn analyze_duplicates(entries: &[ListEntry]) -> DuplicateAnalysis {
    let mut groups: BTreeMap<&HtsCode, Vec<&ListEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(&entry.code).or_default().push(entry);
    }

    let mut codes: Vec<DuplicateCode> = groups
        .into_iter()
        .filter(|(_, group)| group.len() > 1)
        .map(|(code, mut group)| {
            group.sort_by_key(|entry| entry.priority());
            let lists: Vec<&Section301List> = group.iter().map(|entry| &entry.list).collect();
            DuplicateCode {
                code: code.clone(),
                raw_code: group[0].raw_code.clone(),
                lists: lists.iter().map(|list| list.label().to_string()).collect(),
                tiers: lists.iter().map(|list| list.tier_label()).collect(),
            }
        })
        .collect();
    codes.sort_by(|a, b| {
        b.lists
            .len()
            .cmp(&a.lists.len())
            .then_with(|| a.code.cmp(&b.code))
    });

    let mut combination_counts: BTreeMap<String, usize> = BTreeMap::new();
    for code in &codes {
        *combination_counts.entry(code.lists.join(", ")).or_insert(0) += 1;
    }
    let mut combinations: Vec<(String, usize)> = combination_counts.into_iter().collect();
    combinations.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    DuplicateAnalysis {
        codes,
        combinations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_list_combination() {
        let entries = vec![
            ListEntry::new("8471.30.01", "Laptops", Section301List::List4A),
            ListEntry::new("8471.30.01", "Laptops", Section301List::List1),
            ListEntry::new("8471.50.01", "Processing units", Section301List::List1),
            ListEntry::new("8471.50.01", "Processing units", Section301List::List4A),
            ListEntry::new("2845.90.00", "Heavy water", Section301List::List3),
            ListEntry::new("8542.31.00", "Processors", Section301List::List1),
            ListEntry::new("8542.31.00", "Processors", Section301List::List2),
            ListEntry::new("8542.31.00", "Processors", Section301List::List3),
        ];
        let analysis = analyze_duplicates(&entries);
        assert_eq!(analysis.codes.len(), 3);
        assert_eq!(analysis.codes[0].code.as_str(), "85423100");
        assert_eq!(analysis.codes[1].lists, vec!["1", "4a"]);
        assert_eq!(analysis.codes[1].tiers, vec!["25%", "7.5%"]);
        assert_eq!(
            analysis.combinations,
            vec![("1, 4a".to_string(), 2), ("1, 2, 3".to_string(), 1)]
        );
    }
}
