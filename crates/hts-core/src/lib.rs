//! Duty resolution engine.
//!
//! Base rows are cleaned ([`clean`]), resolved against the rule catalog and
//! the Section 301 / 201 lookups ([`resolver`]) and gathered into a schedule
//! document ([`assemble`], [`document`]). List tables are combined, analyzed
//! and deduplicated by [`combine`], [`analysis`] and [`dedupe`].

pub mod analysis;
pub mod assemble;
pub mod clean;
pub mod combine;
pub mod dedupe;
pub mod document;
pub mod resolver;

pub use analysis::{DuplicateAnalysis, DuplicateCode, analyze_duplicates};
pub use assemble::{DutyCounts, RowOutcome, ScheduleAssembler, ScheduleStats};
pub use clean::{CleanedRow, SENTINEL_RATE, clean_row, parse_additional_duty};
pub use combine::{CombinedLists, combine_lists};
pub use dedupe::{CodeCollision, DedupOutcome, DedupReport, TierMove, deduplicate};
pub use document::{
    FORMAT_VERSION, InputFingerprint, RunDescription, ScheduleDocument, ScheduleMetadata,
};
pub use resolver::{
    Column2Attribution, DutyResolver, ResolverContext, ResolverOptions, chapter_99_type,
    is_special_provision,
};
