//! List deduplication: one controlling entry per canonical code.
//!
//! When a code appears on several Section 301 lists the most recent list
//! controls, reflecting deletions from the earlier lists.

use std::collections::{BTreeMap, BTreeSet};

use hts_model::{HtsCode, ListEntry, Section301List, controlling_entries, digits_only};
use serde::Serialize;
use tracing::{info, warn};

/// A code whose controlling list moved it from the 25 % tier to List 4A.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierMove {
    pub code: HtsCode,
    pub raw_code: String,
    pub previous_lists: Vec<String>,
}

/// Distinct raw spellings that normalize to the same key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeCollision {
    pub code: HtsCode,
    pub raw_codes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DedupReport {
    pub input_entries: usize,
    pub unique_codes: usize,
    /// Codes listed on more than one list.
    pub multi_list_codes: usize,
    /// Entries belonging to those codes.
    pub multi_list_entries: usize,
    pub moved_to_reduced_tier: Vec<TierMove>,
    /// Controlling-list label to code count.
    pub distribution: BTreeMap<String, usize>,
    pub collisions: Vec<CodeCollision>,
}

#[derive(Debug, Clone)]
pub struct DedupOutcome {
    /// Controlling entries sorted by canonical code.
    pub entries: Vec<ListEntry>,
    pub report: DedupReport,
}

pub fn deduplicate(entries: Vec<ListEntry>) -> DedupOutcome {
    let mut report = DedupReport {
        input_entries: entries.len(),
        ..DedupReport::default()
    };
    let tier_moves = scan_groups(&entries, &mut report);

    let kept = controlling_entries(entries);
    for entry in &kept {
        *report
            .distribution
            .entry(entry.list.label().to_string())
            .or_insert(0) += 1;
        if let Some(previous_lists) = tier_moves.get(&entry.code)
            && entry.list == Section301List::List4A
        {
            report.moved_to_reduced_tier.push(TierMove {
                code: entry.code.clone(),
                raw_code: entry.raw_code.clone(),
                previous_lists: previous_lists.clone(),
            });
        }
    }
    report.unique_codes = kept.len();

    info!(
        input_entries = report.input_entries,
        unique_codes = report.unique_codes,
        multi_list_codes = report.multi_list_codes,
        moved_to_reduced_tier = report.moved_to_reduced_tier.len(),
        collisions = report.collisions.len(),
        "deduplicated section 301 lists"
    );
    DedupOutcome {
        entries: kept,
        report,
    }
}

/// Group statistics, collisions and the 25 % tier lists of codes that also
/// appear on List 4A.
fn scan_groups(entries: &[ListEntry], report: &mut DedupReport) -> BTreeMap<HtsCode, Vec<String>> {
    let mut groups: BTreeMap<&HtsCode, Vec<&ListEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(&entry.code).or_default().push(entry);
    }

    let mut tier_moves = BTreeMap::new();
    for (code, group) in groups {
        let lists: BTreeSet<u8> = group.iter().map(|entry| entry.priority()).collect();
        if group.len() > 1 {
            report.multi_list_entries += group.len();
            if lists.len() > 1 {
                report.multi_list_codes += 1;
            }
        }

        let on_reduced_tier = group.iter().any(|entry| entry.list == Section301List::List4A);
        let previous: BTreeSet<&str> = group
            .iter()
            .filter(|entry| entry.list.rate() == 25.0)
            .map(|entry| entry.list.label())
            .collect();
        if on_reduced_tier && !previous.is_empty() {
            tier_moves.insert(
                code.clone(),
                previous.into_iter().map(str::to_string).collect(),
            );
        }

        let raw_codes: BTreeSet<&str> = group.iter().map(|entry| entry.raw_code.as_str()).collect();
        let distinct_digits: BTreeSet<String> =
            raw_codes.iter().map(|raw| digits_only(raw)).collect();
        if distinct_digits.len() > 1 {
            warn!(
                code = %code,
                raw_codes = ?raw_codes,
                "distinct codes normalize to the same key"
            );
            report.collisions.push(CodeCollision {
                code: code.clone(),
                raw_codes: raw_codes.into_iter().map(str::to_string).collect(),
            });
        }
    }
    tier_moves
}
