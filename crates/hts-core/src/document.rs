//! The serialized schedule document.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use hts_model::{CountryProgram, DutyRule, ResolvedEntry, country_programs};
use hts_standards::RuleCatalog;
use serde::Serialize;

use crate::assemble::ScheduleStats;
use crate::resolver::ResolverOptions;

pub const FORMAT_VERSION: &str = "2.0";

/// Content hash of one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputFingerprint {
    /// `base_schedule`, `section_301`, `section_201` or `rules`.
    pub role: String,
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleMetadata {
    #[serde(flatten)]
    pub stats: ScheduleStats,
    pub inject_extra_tariffs: bool,
    pub section_301_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    pub format_version: &'static str,
    pub hts_revision: String,
    pub inputs: Vec<InputFingerprint>,
    pub rules: Vec<DutyRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleDocument {
    pub generation_date: String,
    pub hts_revision: String,
    pub entries: Vec<ResolvedEntry>,
    pub metadata: ScheduleMetadata,
    pub country_programs: BTreeMap<&'static str, CountryProgram>,
}

/// Everything about a run that is not an entry.
#[derive(Debug, Clone)]
pub struct RunDescription {
    pub generation_date: NaiveDate,
    pub hts_revision: String,
    pub options: ResolverOptions,
    pub section_301_only: bool,
    pub inputs: Vec<InputFingerprint>,
}

impl ScheduleDocument {
    pub fn new(
        run: RunDescription,
        catalog: &RuleCatalog,
        entries: Vec<ResolvedEntry>,
        stats: ScheduleStats,
    ) -> Self {
        let rules = catalog
            .snapshot(run.options.inject_extra_tariffs)
            .into_iter()
            .cloned()
            .collect();
        Self {
            generation_date: run.generation_date.format("%Y-%m-%d").to_string(),
            hts_revision: run.hts_revision.clone(),
            entries,
            metadata: ScheduleMetadata {
                stats,
                inject_extra_tariffs: run.options.inject_extra_tariffs,
                section_301_only: run.section_301_only,
                as_of: run.options.as_of,
                format_version: FORMAT_VERSION,
                hts_revision: run.hts_revision,
                inputs: run.inputs,
                rules,
            },
            country_programs: country_programs(),
        }
    }
}
