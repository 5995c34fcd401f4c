//! CSV rule-table loader.
//!
//! A supplied table replaces the built-in catalog. One row per rule:
//!
//! ```text
//! RuleName,RuleType,AppliesTo_DataType,AppliesTo_Value,Countries,Rate,Effective
//! section_232_steel,section_232,chapter,72;73,all,50,2018-03-23
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use hts_model::{Applicability, CountryScope, DutyKind, DutyRule, ReducedRate, RuleStatus};
use tracing::debug;

use crate::catalog::RuleCatalog;
use crate::csv_utils::{CsvRow, read_csv_rows};
use crate::error::{Result, StandardsError};

const REQUIRED_COLUMNS: [&str; 6] = [
    "RuleName",
    "RuleType",
    "AppliesTo_DataType",
    "AppliesTo_Value",
    "Countries",
    "Rate",
];

/// Load a complete rule catalog from a CSV rule table.
pub fn load_rule_table(path: &Path) -> Result<RuleCatalog> {
    let rows = read_csv_rows(path, &REQUIRED_COLUMNS)?;
    let mut names = BTreeSet::new();
    let mut rules = Vec::with_capacity(rows.len());
    for row in &rows {
        let rule = parse_rule(path, row)?;
        if !names.insert(rule.name.clone()) {
            return Err(StandardsError::DuplicateRule {
                path: path.to_path_buf(),
                line: row.line,
                name: rule.name,
            });
        }
        debug!(rule = %rule.name, kind = %rule.kind, applies_to = %rule.applies_to, "loaded rule");
        rules.push(rule);
    }
    RuleCatalog::from_rules(rules)
}

fn parse_rule(path: &Path, row: &CsvRow) -> Result<DutyRule> {
    let invalid = |message: String| StandardsError::InvalidRule {
        path: path.to_path_buf(),
        line: row.line,
        message,
    };
    let model = |source| StandardsError::InvalidRuleValue {
        path: path.to_path_buf(),
        line: row.line,
        source,
    };

    let name = row
        .optional("RuleName")
        .ok_or_else(|| invalid("RuleName is empty".to_string()))?;
    let kind: DutyKind = row.get("RuleType").parse().map_err(model)?;
    let applies_to =
        Applicability::parse(row.get("AppliesTo_DataType"), row.get("AppliesTo_Value"))
            .map_err(model)?;
    let rate = parse_rate(row.get("Rate"))
        .ok_or_else(|| invalid(format!("invalid Rate: {:?}", row.get("Rate"))))?;
    let title = row.optional("Title").unwrap_or(name);

    let mut rule = DutyRule::new(name, kind, title, applies_to, rate);
    rule.countries = CountryScope::parse(row.get("Countries"));
    rule.status = row.get("Status").parse().map_err(model)?;
    rule.effective = parse_date(row.optional("Effective"))
        .map_err(|raw| invalid(format!("invalid Effective date: {raw:?}")))?;
    rule.expires = parse_date(row.optional("Expiry"))
        .map_err(|raw| invalid(format!("invalid Expiry date: {raw:?}")))?;
    rule.note = row.optional("Note").map(str::to_string);
    rule.legal_status = row.optional("Legal_Status").map(str::to_string);
    rule.provision_codes = split_cell(row.get("Provision_Codes"))
        .map(str::to_string)
        .collect();
    rule.excluded_countries = split_cell(row.get("Excluded_Countries"))
        .map(str::to_uppercase)
        .collect();

    if let Some(raw) = row.optional("Exempt_Prefixes") {
        rule.exemptions = vec![Applicability::parse("prefix", raw).map_err(model)?];
    }

    for item in split_cell(row.get("Country_Rates")) {
        let parsed = item
            .split_once(':')
            .and_then(|(country, rate)| Some((country.trim(), parse_rate(rate)?)))
            .filter(|(country, _)| !country.is_empty());
        let Some((country, rate)) = parsed else {
            return Err(invalid(format!("invalid Country_Rates item: {item:?}")));
        };
        rule.country_rates.insert(country.to_uppercase(), rate);
    }

    match (row.optional("Reduced_Rate"), row.optional("Reduced_AppliesTo")) {
        (None, None) => {}
        (Some(raw), Some(products)) => {
            let rate = parse_rate(raw)
                .ok_or_else(|| invalid(format!("invalid Reduced_Rate: {raw:?}")))?;
            let product_types = split_cell(products)
                .map(str::parse)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(model)?;
            rule.reduced_rate = Some(ReducedRate {
                rate,
                product_types,
            });
        }
        _ => {
            return Err(invalid(
                "Reduced_Rate and Reduced_AppliesTo must be given together".to_string(),
            ));
        }
    }

    if rule.status == RuleStatus::Inactive {
        debug!(rule = %rule.name, "rule marked inactive");
    }
    Ok(rule)
}

/// Percent value; a trailing `%` is accepted. Negative or non-finite rates are rejected.
fn parse_rate(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().trim_end_matches('%').trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn parse_date(raw: Option<&str>) -> std::result::Result<Option<NaiveDate>, String> {
    raw.map(|value| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| value.to_string())
    })
    .transpose()
}

fn split_cell(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hts_model::{HtsCode, ProductType};

    fn write_table(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("rules.csv");
        std::fs::write(&path, contents).expect("write rules");
        (dir, path)
    }

    const HEADER: &str = "RuleName,RuleType,AppliesTo_DataType,AppliesTo_Value,Countries,Rate,Effective,Expiry,Reduced_Rate,Reduced_AppliesTo,Country_Rates,Exempt_Prefixes,Status\n";

    #[test]
    fn loads_complete_rules() {
        let (_dir, path) = write_table(&format!(
            "{HEADER}\
             section_232_steel,section_232,chapter,72;73,all,50%,2018-03-23,,,,GB:25;UK:25,,\n\
             ieepa_canada,ieepa,all,,CA,25,2025-03-04,,10,energy;potash,,,\n\
             reciprocal_china,reciprocal,all,,CN,10,2025-05-14,2025-08-12,,,,8541;8542,inactive\n"
        ));
        let catalog = load_rule_table(&path).expect("load rules");
        assert_eq!(catalog.len(), 3);

        let steel = catalog.get("section_232_steel").expect("steel");
        assert_eq!(steel.rate, 50.0);
        assert_eq!(steel.country_rates.get("UK"), Some(&25.0));
        assert_eq!(steel.title, "section_232_steel");

        let canada = catalog.get("ieepa_canada").expect("canada");
        let reduced = canada.reduced_rate.as_ref().expect("reduced rate");
        assert_eq!(reduced.product_types, vec![ProductType::Energy, ProductType::Potash]);
        assert!(canada.countries.includes("CA"));
        assert!(!canada.countries.includes("MX"));

        let reciprocal = catalog.get("reciprocal_china").expect("reciprocal");
        assert!(!reciprocal.is_active());
        assert!(reciprocal.is_exempt(&HtsCode::normalize("8541.42.00")));
        assert_eq!(reciprocal.expires, NaiveDate::from_ymd_opt(2025, 8, 12));
    }

    #[test]
    fn duplicate_names_are_fatal() {
        let (_dir, path) = write_table(&format!(
            "{HEADER}\
             dup,section_301,all,,CN,25,,,,,,,\n\
             dup,section_301,all,,CN,25,,,,,,,\n"
        ));
        let err = load_rule_table(&path).unwrap_err();
        assert!(matches!(err, StandardsError::DuplicateRule { ref name, .. } if name == "dup"));
    }

    #[test]
    fn bad_values_are_fatal() {
        for row in [
            "x,section_122,all,,all,10,,,,,,,\n",
            "x,section_301,heading,72,all,10,,,,,,,\n",
            "x,section_301,all,,all,ten,,,,,,,\n",
            "x,section_301,all,,all,10,2025-13-01,,,,,,\n",
            "x,ieepa,all,,CA,25,,,10,,,,\n",
            "x,section_232,chapter,72,all,50,,,,,GB,,\n",
        ] {
            let (_dir, path) = write_table(&format!("{HEADER}{row}"));
            assert!(load_rule_table(&path).is_err(), "row should fail: {row}");
        }
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let (_dir, path) = write_table("RuleName,RuleType\nx,section_301\n");
        let err = load_rule_table(&path).unwrap_err();
        assert!(matches!(err, StandardsError::MissingColumn { .. }));
    }
}
