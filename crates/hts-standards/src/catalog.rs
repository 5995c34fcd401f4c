//! Registry of additive-duty rules.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use hts_model::{
    Applicability, CountryScope, DutyKind, DutyRule, ProductType, ReducedRate,
};

use crate::error::{Result, StandardsError};

/// Read-only set of duty rules, iterated in enactment order.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: Vec<DutyRule>,
    by_name: BTreeMap<String, usize>,
}

impl RuleCatalog {
    /// Build a catalog, rejecting duplicate names.
    pub fn from_rules(rules: Vec<DutyRule>) -> Result<Self> {
        if let Some(name) = first_duplicate(&rules) {
            return Err(StandardsError::DuplicateRuleName { name });
        }
        Ok(Self::sorted(rules))
    }

    /// Programs in force as of mid-2025.
    pub fn builtin() -> Self {
        Self::sorted(builtin_rules())
    }

    fn sorted(mut rules: Vec<DutyRule>) -> Self {
        rules.sort_by(|a, b| {
            a.effective
                .cmp(&b.effective)
                .then_with(|| a.name.cmp(&b.name))
        });
        let by_name = rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| (rule.name.clone(), idx))
            .collect();
        Self { rules, by_name }
    }

    pub fn get(&self, name: &str) -> Option<&DutyRule> {
        self.by_name.get(name).map(|&idx| &self.rules[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &DutyRule> {
        self.rules.iter()
    }

    pub fn of_kind(&self, kind: DutyKind) -> impl Iterator<Item = &DutyRule> {
        self.rules.iter().filter(move |rule| rule.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules recorded in the output metadata; extra tariffs are left out
    /// unless they are being injected.
    pub fn snapshot(&self, include_extra_tariffs: bool) -> Vec<&DutyRule> {
        self.rules
            .iter()
            .filter(|rule| include_extra_tariffs || !rule.kind.is_extra_tariff())
            .collect()
    }
}

fn first_duplicate(rules: &[DutyRule]) -> Option<String> {
    let mut seen = BTreeSet::new();
    rules
        .iter()
        .find(|rule| !seen.insert(rule.name.as_str()))
        .map(|rule| rule.name.clone())
}

const UK_COUNTRY_CODES: [&str; 2] = ["GB", "UK"];
const UK_RATE: f64 = 25.0;

const SOLAR_EXCLUDED_COUNTRIES: [&str; 20] = [
    "AU", "BH", "CA", "CL", "CO", "CR", "DO", "SV", "GT", "HN", "IL", "JO", "KR", "MX", "MA",
    "NI", "OM", "PA", "PE", "SG",
];

const IEEPA_NOTE: &str = "USMCA-origin goods exempt; Does not stack with Section 232";
const IEEPA_LEGAL_STATUS: &str = "Under judicial review, currently in effect";

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn section_232(name: &str, title: &str, chapters: &[&str], provisions: &[&str]) -> DutyRule {
    let mut rule = DutyRule::new(
        name,
        DutyKind::Section232,
        title,
        Applicability::chapters(chapters.iter().copied()),
        50.0,
    );
    rule.country_rates = UK_COUNTRY_CODES
        .iter()
        .map(|code| ((*code).to_string(), UK_RATE))
        .collect();
    rule.provision_codes = provisions.iter().map(|code| (*code).to_string()).collect();
    rule.effective = date(2018, 3, 23);
    rule.note = Some(
        "Increased from 25% to 50% on June 4, 2025 (except UK remains at 25%)".to_string(),
    );
    rule
}

fn builtin_rules() -> Vec<DutyRule> {
    let steel = section_232(
        "section_232_steel",
        "Section 232 - Steel",
        &["72", "73"],
        &["9903.80.05", "9903.80.06", "9903.80.07", "9903.80.08"],
    );
    let aluminum = section_232(
        "section_232_aluminum",
        "Section 232 - Aluminum",
        &["76"],
        &["9903.85.12", "9903.85.13", "9903.85.14", "9903.85.15"],
    );

    let mut section_301 = DutyRule::new(
        "section_301",
        DutyKind::Section301,
        "Section 301 - China Trade",
        Applicability::All,
        25.0,
    );
    section_301.countries = CountryScope::only(["CN"]);
    section_301.effective = date(2018, 7, 6);
    section_301.note =
        Some("Rate follows the controlling list: 25% for lists 1-3, 7.5% for list 4A".to_string());

    let mut solar = DutyRule::new(
        "section_201_solar",
        DutyKind::Section201,
        "Section 201 - Solar",
        Applicability::ProductType(ProductType::Solar),
        14.25,
    );
    solar.excluded_countries = SOLAR_EXCLUDED_COUNTRIES
        .iter()
        .map(|code| (*code).to_string())
        .collect();
    solar.effective = date(2018, 2, 7);
    solar.expires = date(2026, 2, 6);
    solar.note = Some("FTA partners and GSP beneficiaries excluded".to_string());

    let mut fentanyl = DutyRule::new(
        "fentanyl_china",
        DutyKind::FentanylChina,
        "Fentanyl Anti-Trafficking Tariff - China",
        Applicability::All,
        20.0,
    );
    fentanyl.countries = CountryScope::only(["CN"]);
    // U.S. goods returned and personal exemptions
    fentanyl.exemptions = vec![Applicability::chapters(["98"])];
    fentanyl.effective = date(2025, 3, 4);
    fentanyl.note = Some("Anti-trafficking measure".to_string());

    let mut canada = DutyRule::new(
        "ieepa_canada",
        DutyKind::Ieepa,
        "IEEPA Tariff - Canada",
        Applicability::All,
        25.0,
    );
    canada.countries = CountryScope::only(["CA"]);
    canada.reduced_rate = Some(ReducedRate {
        rate: 10.0,
        product_types: vec![ProductType::Energy, ProductType::Potash],
    });
    canada.effective = date(2025, 3, 4);
    canada.note = Some(IEEPA_NOTE.to_string());
    canada.legal_status = Some(IEEPA_LEGAL_STATUS.to_string());

    let mut mexico = DutyRule::new(
        "ieepa_mexico",
        DutyKind::Ieepa,
        "IEEPA Tariff - Mexico",
        Applicability::All,
        25.0,
    );
    mexico.countries = CountryScope::only(["MX"]);
    mexico.reduced_rate = Some(ReducedRate {
        rate: 10.0,
        product_types: vec![ProductType::Potash],
    });
    mexico.effective = date(2025, 3, 4);
    mexico.note = Some(IEEPA_NOTE.to_string());
    mexico.legal_status = Some(IEEPA_LEGAL_STATUS.to_string());

    let mut reciprocal = DutyRule::new(
        "reciprocal_china",
        DutyKind::ReciprocalChina,
        "Reciprocal Tariff - China",
        Applicability::All,
        10.0,
    );
    reciprocal.countries = CountryScope::only(["CN"]);
    reciprocal.exemptions = vec![
        // pharmaceuticals
        Applicability::chapters(["30"]),
        // medical devices
        Applicability::prefixes(["9018", "9019", "9020", "9021", "9022"]),
        // semiconductors
        Applicability::prefixes(["8541", "8542"]),
    ];
    reciprocal.effective = date(2025, 5, 14);
    reciprocal.expires = date(2025, 8, 12);
    reciprocal.note = Some("Temporary 90-day agreement".to_string());

    vec![
        steel,
        aluminum,
        section_301,
        solar,
        fentanyl,
        canada,
        mexico,
        reciprocal,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use hts_model::HtsCode;

    #[test]
    fn builtin_rules_are_ordered_by_enactment() {
        let catalog = RuleCatalog::builtin();
        let names: Vec<&str> = catalog.iter().map(|rule| rule.name.as_str()).collect();
        insta::assert_snapshot!(names.join("\n"), @r"
        section_201_solar
        section_232_aluminum
        section_232_steel
        section_301
        fentanyl_china
        ieepa_canada
        ieepa_mexico
        reciprocal_china
        ");
    }

    #[test]
    fn lookup_by_name() {
        let catalog = RuleCatalog::builtin();
        let steel = catalog.get("section_232_steel").expect("steel rule");
        assert_eq!(steel.rate, 50.0);
        assert_eq!(steel.country_rates.get("GB"), Some(&25.0));
        assert!(steel.covers(&HtsCode::normalize("7208.10.00")));
        assert!(catalog.get("section_122").is_none());
        assert_eq!(catalog.of_kind(DutyKind::Ieepa).count(), 2);
    }

    #[test]
    fn snapshot_drops_extra_tariffs_unless_injected() {
        let catalog = RuleCatalog::builtin();
        assert_eq!(catalog.snapshot(true).len(), catalog.len());
        let core: Vec<&str> = catalog
            .snapshot(false)
            .iter()
            .map(|rule| rule.name.as_str())
            .collect();
        assert_eq!(core.len(), 4);
        assert!(!core.contains(&"reciprocal_china"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let rule = DutyRule::new("dup", DutyKind::TradeAction, "Dup", Applicability::All, 1.0);
        let err = RuleCatalog::from_rules(vec![rule.clone(), rule]).unwrap_err();
        assert!(matches!(err, StandardsError::DuplicateRuleName { .. }));
    }

    #[test]
    fn reciprocal_exemptions_cover_pharma_and_semiconductors() {
        let catalog = RuleCatalog::builtin();
        let reciprocal = catalog.get("reciprocal_china").expect("reciprocal rule");
        assert!(reciprocal.is_exempt(&HtsCode::normalize("3004.90.92")));
        assert!(reciprocal.is_exempt(&HtsCode::normalize("9018.11.00")));
        assert!(reciprocal.is_exempt(&HtsCode::normalize("8542.31.00")));
        assert!(!reciprocal.is_exempt(&HtsCode::normalize("8471.30.01")));
    }
}
