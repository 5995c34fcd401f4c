//! Schedule assembly: rows in, resolved entries and run statistics out.

use std::collections::BTreeMap;

use hts_model::{DutyKind, ResolvedEntry, TariffRow};
use serde::Serialize;
use tracing::debug;

use crate::clean::clean_row;
use crate::resolver::DutyResolver;

/// Duty instances emitted per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DutyCounts {
    pub section_232: usize,
    pub section_301: usize,
    pub section_201: usize,
    pub ieepa: usize,
    pub reciprocal_china: usize,
    pub fentanyl_china: usize,
    pub trade_action: usize,
}

impl DutyCounts {
    pub fn record(&mut self, kind: DutyKind) {
        *self.slot(kind) += 1;
    }

    pub fn get(&self, kind: DutyKind) -> usize {
        match kind {
            DutyKind::Section232 => self.section_232,
            DutyKind::Section301 => self.section_301,
            DutyKind::Section201 => self.section_201,
            DutyKind::Ieepa => self.ieepa,
            DutyKind::ReciprocalChina => self.reciprocal_china,
            DutyKind::FentanylChina => self.fentanyl_china,
            DutyKind::TradeAction => self.trade_action,
        }
    }

    fn slot(&mut self, kind: DutyKind) -> &mut usize {
        match kind {
            DutyKind::Section232 => &mut self.section_232,
            DutyKind::Section301 => &mut self.section_301,
            DutyKind::Section201 => &mut self.section_201,
            DutyKind::Ieepa => &mut self.ieepa,
            DutyKind::ReciprocalChina => &mut self.reciprocal_china,
            DutyKind::FentanylChina => &mut self.fentanyl_china,
            DutyKind::TradeAction => &mut self.trade_action,
        }
    }
}

/// Run counters reported in the summary and the document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleStats {
    pub total_rows: usize,
    pub total_entries: usize,
    /// Rows without code digits.
    pub skipped_rows: usize,
    /// Rows dropped by section-301-only mode.
    pub filtered_rows: usize,
    /// Numeric cells that failed to parse.
    pub degraded_values: usize,
    pub chapter_99_entries: usize,
    pub special_provisions: usize,
    pub trade_action_entries: usize,
    pub extra_tariff_entries: usize,
    pub duty_counts: DutyCounts,
    /// Entries per controlling Section 301 list.
    pub section_301_breakdown: BTreeMap<String, usize>,
}

impl ScheduleStats {
    fn record(&mut self, entry: &ResolvedEntry) {
        self.total_entries += 1;
        if entry.is_chapter_99 {
            self.chapter_99_entries += 1;
        }
        if entry.is_special_provision {
            self.special_provisions += 1;
        }
        if entry.has_trade_action {
            self.trade_action_entries += 1;
        }
        if entry.has_extra_tariff() {
            self.extra_tariff_entries += 1;
        }
        for duty in &entry.duties {
            self.duty_counts.record(duty.kind);
        }
        if let Some(list) = &entry.section_301_list {
            *self.section_301_breakdown.entry(list.clone()).or_insert(0) += 1;
        }
    }
}

/// What happened to one pushed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Emitted,
    Skipped,
    Filtered,
}

pub struct ScheduleAssembler<'a> {
    resolver: DutyResolver<'a>,
    section_301_only: bool,
    entries: Vec<ResolvedEntry>,
    stats: ScheduleStats,
}

impl<'a> ScheduleAssembler<'a> {
    pub fn new(resolver: DutyResolver<'a>, section_301_only: bool) -> Self {
        Self {
            resolver,
            section_301_only,
            entries: Vec::new(),
            stats: ScheduleStats::default(),
        }
    }

    pub fn push_row(&mut self, row: TariffRow) -> RowOutcome {
        self.stats.total_rows += 1;
        let Some(cleaned) = clean_row(row) else {
            self.stats.skipped_rows += 1;
            return RowOutcome::Skipped;
        };
        self.stats.degraded_values += cleaned.degraded;
        if self.section_301_only && !self.resolver.has_section_301(&cleaned.code) {
            self.stats.filtered_rows += 1;
            return RowOutcome::Filtered;
        }

        let entry = self.resolver.resolve_entry(cleaned.code, cleaned.entry);
        debug!(
            code = %entry.base.hts8,
            duties = entry.duties.len(),
            "resolved entry"
        );
        self.stats.record(&entry);
        self.entries.push(entry);
        RowOutcome::Emitted
    }

    pub fn stats(&self) -> &ScheduleStats {
        &self.stats
    }

    pub fn finish(self) -> (Vec<ResolvedEntry>, ScheduleStats) {
        (self.entries, self.stats)
    }
}
