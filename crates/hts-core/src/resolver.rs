//! Duty resolution: the ordered set of additive duties for one code.
//!
//! Evaluation order is fixed:
//!
//! 1. Section 232 (a match suppresses steps 2-4)
//! 2. Section 301, from the deduplicated list table
//! 3. Section 201, from the solar lookup or the rule's product predicate
//! 4. Country-scoped extra tariffs (reciprocal, fentanyl, IEEPA), on request
//! 5. Special-provision detection on the MFN rate
//! 6. Column 2 attribution

use std::collections::BTreeMap;

use chrono::NaiveDate;
use hts_model::{
    AvailableProgram, BaseTariffEntry, COLUMN2_COUNTRIES, Chapter99Type, CountryScope,
    DutyInstance, DutyKind, DutyRule, HtsCode, NTR_SUSPENDED_COUNTRIES, ResolvedEntry,
    format_percent,
};
use hts_standards::{RuleCatalog, Section201Table, Section301Table};
use tracing::trace;

use crate::clean::parse_additional_duty;

/// MFN ad-valorem value published for Chapter 99 provisions.
pub const SPECIAL_PROVISION_SENTINEL: f64 = 9999.999999;

/// Column 2 must exceed MFN by at least this much (as a fraction) to count
/// as a trade action.
pub const TRADE_ACTION_THRESHOLD: f64 = 0.10;

const RATE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Emit reciprocal, fentanyl and IEEPA duties.
    pub inject_extra_tariffs: bool,
    /// Skip rules not in force on this date. `None` disables date filtering.
    pub as_of: Option<NaiveDate>,
}

/// Read-only lookups the resolver consults.
#[derive(Debug, Clone, Copy)]
pub struct ResolverContext<'a> {
    pub catalog: &'a RuleCatalog,
    pub section301: &'a Section301Table,
    pub section201: Option<&'a Section201Table>,
    pub options: ResolverOptions,
}

/// How the Column 2 rate is attributed to countries.
#[derive(Debug, Clone, PartialEq)]
pub enum Column2Attribution {
    /// No positive Column 2 rate.
    None,
    /// Column 2 sits well above MFN: a trade action against these countries.
    TradeAction {
        rate: f64,
        countries: Vec<&'static str>,
    },
    /// Ordinary Column 2 rate for countries without normal trade relations.
    Traditional,
}

impl Column2Attribution {
    /// Classify a Column 2 rate against the MFN rate; both are fractions.
    pub fn classify(mfn: f64, col2: f64) -> Self {
        if col2 <= 0.0 {
            return Column2Attribution::None;
        }
        let difference = col2 - mfn;
        if difference + RATE_EPSILON >= TRADE_ACTION_THRESHOLD
            && col2 + RATE_EPSILON >= TRADE_ACTION_THRESHOLD
        {
            let countries = if (col2 - 0.25).abs() < RATE_EPSILON {
                vec!["CA", "MX"]
            } else if (col2 - 0.10).abs() < RATE_EPSILON {
                vec!["CA"]
            } else {
                Vec::new()
            };
            Column2Attribution::TradeAction {
                rate: (col2 * 100.0 * 1e6).round() / 1e6,
                countries,
            }
        } else {
            Column2Attribution::Traditional
        }
    }
}

/// True when the MFN ad-valorem value is a special-provision indicator.
pub fn is_special_provision(mfn_ad_val_rate: f64) -> bool {
    (mfn_ad_val_rate - SPECIAL_PROVISION_SENTINEL).abs() < RATE_EPSILON || mfn_ad_val_rate > 100.0
}

/// Provision type recognized from the code digits.
pub fn chapter_99_type(hts8: &str) -> Option<Chapter99Type> {
    if hts8.contains("99030110") {
        Some(Chapter99Type::CanadaSpecial)
    } else if hts8.contains("990385") {
        Some(Chapter99Type::AluminumSteel)
    } else {
        None
    }
}

pub struct DutyResolver<'a> {
    ctx: ResolverContext<'a>,
}

impl<'a> DutyResolver<'a> {
    pub fn new(ctx: ResolverContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn options(&self) -> ResolverOptions {
        self.ctx.options
    }

    pub fn has_section_301(&self, code: &HtsCode) -> bool {
        self.ctx.section301.contains(code)
    }

    /// Ordered duty instances for `code`.
    pub fn resolve(&self, code: &HtsCode, base: &BaseTariffEntry) -> Vec<DutyInstance> {
        self.resolve_entry(code.clone(), base.clone()).duties
    }

    /// Base entry enriched with duties, flags and program details.
    pub fn resolve_entry(&self, code: HtsCode, mut base: BaseTariffEntry) -> ResolvedEntry {
        let special = is_special_provision(base.mfn_ad_val_rate);
        let mut duties = self.additive_duties(&code, special);

        let mut chapter_99_additional_rate = None;
        let mut chapter_99_duty_text = None;
        let mut provision_type = None;
        if special {
            base.mfn_ad_val_rate = 0.0;
            if let Some(text) = base.mfn_text_rate.as_deref()
                && let Some(rate) = parse_additional_duty(text)
            {
                chapter_99_additional_rate = Some(rate);
                chapter_99_duty_text = Some(text.to_string());
                provision_type = chapter_99_type(&base.hts8);
            }
        }

        let column2 = self.column2(&base, special);
        let mut ntr_suspended_countries = Vec::new();
        let mut column2_countries = Vec::new();
        let mut has_trade_action = false;
        match column2 {
            Column2Attribution::None => {}
            Column2Attribution::TradeAction { rate, countries } => {
                ntr_suspended_countries = to_strings(NTR_SUSPENDED_COUNTRIES);
                duties.push(trade_action(rate, &countries));
                has_trade_action = true;
            }
            Column2Attribution::Traditional => {
                ntr_suspended_countries = to_strings(NTR_SUSPENDED_COUNTRIES);
                column2_countries = to_strings(COLUMN2_COUNTRIES);
            }
        }

        let section_301 = self.ctx.section301.get(&code);
        let available_programs = base
            .programs
            .iter()
            .filter(|program| program.is_available())
            .filter_map(|program| {
                program.ad_val_rate.map(|rate| AvailableProgram {
                    program_key: program.program.key(),
                    program_name: program.program_name,
                    rate,
                })
            })
            .collect();

        ResolvedEntry {
            is_chapter_99: code.is_chapter_99(),
            normalized_code: code,
            is_special_provision: special,
            has_trade_action,
            chapter_99_additional_rate,
            chapter_99_duty_text,
            chapter_99_type: provision_type,
            section_301_list: section_301.map(|entry| entry.list.label().to_string()),
            section_301_rate: section_301.map(|entry| entry.rate),
            ntr_suspended_countries,
            column2_countries,
            available_programs,
            duties,
            base,
        }
    }

    /// Steps 1-4.
    fn additive_duties(&self, code: &HtsCode, special: bool) -> Vec<DutyInstance> {
        if let Some(duty) = self.section_232(code) {
            trace!(code = %code, rule = %duty.rule, "section 232 match suppresses other duties");
            return vec![duty];
        }

        let mut duties = Vec::new();
        duties.extend(self.section_301(code));
        let section_201 = self.section_201(code);
        let has_section_201 = section_201.is_some();
        duties.extend(section_201);

        if self.ctx.options.inject_extra_tariffs && !code.is_chapter_99() && !special {
            for kind in [DutyKind::ReciprocalChina, DutyKind::FentanylChina] {
                duties.extend(self.country_tariffs(kind, code));
            }
            if !has_section_201 {
                duties.extend(self.country_tariffs(DutyKind::Ieepa, code));
            }
        }
        duties
    }

    fn applicable(&self, kind: DutyKind) -> impl Iterator<Item = &'a DutyRule> + use<'a> {
        let as_of = self.ctx.options.as_of;
        self.ctx.catalog.of_kind(kind).filter(move |rule| {
            rule.is_active() && as_of.is_none_or(|date| rule.in_force_on(date))
        })
    }

    fn section_232(&self, code: &HtsCode) -> Option<DutyInstance> {
        let rule = self
            .applicable(DutyKind::Section232)
            .find(|rule| rule.covers(code))?;
        let label = format!(
            "{} ({}{})",
            rule.title,
            format_percent(rule.rate),
            country_rate_summary(&rule.country_rates)
        );
        Some(instance(rule, rule.rate, label))
    }

    fn section_301(&self, code: &HtsCode) -> Option<DutyInstance> {
        let entry = self.ctx.section301.get(code)?;
        let rule = self
            .applicable(DutyKind::Section301)
            .find(|rule| !rule.is_exempt(code))?;
        let label = format!(
            "Section 301 List {} ({})",
            entry.list.label(),
            format_percent(entry.rate)
        );
        let mut duty = instance(rule, entry.rate, label);
        duty.list = Some(entry.list.label().to_string());
        duty.effective = entry.list.effective().or(rule.effective);
        Some(duty)
    }

    fn section_201(&self, code: &HtsCode) -> Option<DutyInstance> {
        let rule = self.applicable(DutyKind::Section201).next()?;
        if let Some(entry) = self.ctx.section201.and_then(|table| table.get(code)) {
            let label = format!("{} ({})", rule.title, format_percent(entry.rate));
            let mut duty = instance(rule, entry.rate, label);
            duty.excluded_countries = entry.exempt_countries.clone();
            duty.product_type = Some(entry.product_type.clone());
            if entry.notes.is_some() {
                duty.note = entry.notes.clone();
            }
            return Some(duty);
        }
        let rule = self
            .applicable(DutyKind::Section201)
            .find(|rule| rule.covers(code))?;
        let label = format!("{} ({})", rule.title, format_percent(rule.rate));
        Some(instance(rule, rule.rate, label))
    }

    fn country_tariffs(&self, kind: DutyKind, code: &HtsCode) -> Vec<DutyInstance> {
        self.applicable(kind)
            .filter(|rule| rule.covers(code))
            .map(|rule| {
                let rate = rule.rate_for(code);
                let label = match rule.reduced_product(code) {
                    Some(product) => format!(
                        "{} ({} - {})",
                        rule.title,
                        format_percent(rate),
                        capitalize(product.as_str())
                    ),
                    None => format!("{} ({})", rule.title, format_percent(rate)),
                };
                let mut duty = instance(rule, rate, label);
                duty.product_type = rule
                    .reduced_product(code)
                    .map(|product| product.as_str().to_string());
                duty
            })
            .collect()
    }

    fn column2(&self, base: &BaseTariffEntry, special: bool) -> Column2Attribution {
        let mfn = if special { 0.0 } else { base.mfn_ad_val_rate };
        Column2Attribution::classify(mfn, base.col2_ad_val_rate.unwrap_or(0.0))
    }
}

/// Instance carrying the rule's scope and metadata.
fn instance(rule: &DutyRule, rate: f64, label: String) -> DutyInstance {
    let mut duty = DutyInstance::new(rule.kind, &rule.name, &rule.title, label, rate);
    duty.countries = rule.countries.clone();
    duty.country_rates = rule.country_rates.clone();
    duty.provision_codes = rule.provision_codes.clone();
    duty.excluded_countries = rule.excluded_countries.clone();
    duty.effective = rule.effective;
    duty.expires = rule.expires;
    duty.note = rule.note.clone();
    duty.legal_status = rule.legal_status.clone();
    duty
}

fn trade_action(rate: f64, countries: &[&str]) -> DutyInstance {
    let mut duty = DutyInstance::new(
        DutyKind::TradeAction,
        "column_2",
        "Trade Action Tariff",
        format!("Trade Action Tariff ({})", format_percent(rate)),
        rate,
    );
    duty.countries = CountryScope::only(countries.iter().copied());
    duty
}

/// `, GB/UK 25%` for country-specific overrides, grouped by rate.
fn country_rate_summary(rates: &BTreeMap<String, f64>) -> String {
    let mut groups: Vec<(f64, Vec<&str>)> = Vec::new();
    for (country, rate) in rates {
        match groups.iter_mut().find(|(group_rate, _)| *group_rate == *rate) {
            Some((_, countries)) => countries.push(country),
            None => groups.push((*rate, vec![country.as_str()])),
        }
    }
    groups
        .iter()
        .map(|(rate, countries)| format!(", {} {}", countries.join("/"), format_percent(*rate)))
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn to_strings(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| (*code).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_column2_rates() {
        assert_eq!(Column2Attribution::classify(0.0, 0.0), Column2Attribution::None);
        assert_eq!(
            Column2Attribution::classify(0.02, 0.25),
            Column2Attribution::TradeAction {
                rate: 25.0,
                countries: vec!["CA", "MX"],
            }
        );
        assert_eq!(
            Column2Attribution::classify(0.0, 0.10),
            Column2Attribution::TradeAction {
                rate: 10.0,
                countries: vec!["CA"],
            }
        );
        assert_eq!(
            Column2Attribution::classify(0.0, 0.35),
            Column2Attribution::TradeAction {
                rate: 35.0,
                countries: vec![],
            }
        );
        assert_eq!(
            Column2Attribution::classify(0.05, 0.12),
            Column2Attribution::Traditional
        );
    }

    #[test]
    fn detects_special_provisions() {
        assert!(is_special_provision(9999.999999));
        assert!(is_special_provision(100.5));
        assert!(!is_special_provision(100.0));
        assert!(!is_special_provision(0.25));
    }

    #[test]
    fn recognizes_chapter_99_types() {
        assert_eq!(chapter_99_type("99030110"), Some(Chapter99Type::CanadaSpecial));
        assert_eq!(chapter_99_type("99038512"), Some(Chapter99Type::AluminumSteel));
        assert_eq!(chapter_99_type("99038001"), None);
    }

    #[test]
    fn summarizes_country_rates() {
        let rates = BTreeMap::from([("GB".to_string(), 25.0), ("UK".to_string(), 25.0)]);
        assert_eq!(country_rate_summary(&rates), ", GB/UK 25%");
        assert_eq!(country_rate_summary(&BTreeMap::new()), "");
    }
}
