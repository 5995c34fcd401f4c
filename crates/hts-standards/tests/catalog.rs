use chrono::NaiveDate;
use hts_model::{CountryScope, DutyKind, HtsCode};
use hts_standards::RuleCatalog;

fn code(raw: &str) -> HtsCode {
    HtsCode::normalize(raw)
}

#[test]
fn builtin_catalog_matches_published_programs() {
    let catalog = RuleCatalog::builtin();
    assert_eq!(catalog.len(), 8);

    let solar = catalog.get("section_201_solar").expect("solar rule");
    assert_eq!(solar.kind, DutyKind::Section201);
    assert_eq!(solar.rate, 14.25);
    assert_eq!(solar.excluded_countries.len(), 20);
    assert!(solar.excluded_countries.iter().any(|c| c == "KR"));
    assert_eq!(solar.expires, NaiveDate::from_ymd_opt(2026, 2, 6));
    assert!(solar.covers(&code("8541.42.00")));
    assert!(!solar.covers(&code("8541.10.00")));

    let aluminum = catalog.get("section_232_aluminum").expect("aluminum rule");
    assert_eq!(
        aluminum.provision_codes,
        vec!["9903.85.12", "9903.85.13", "9903.85.14", "9903.85.15"]
    );
    assert!(aluminum.covers(&code("7601.10.30")));
    assert!(!aluminum.covers(&code("7208.10.00")));

    let section_301 = catalog.get("section_301").expect("301 rule");
    assert_eq!(section_301.countries, CountryScope::only(["CN"]));
}

#[test]
fn ieepa_reduced_rates_follow_product_families() {
    let catalog = RuleCatalog::builtin();
    let canada = catalog.get("ieepa_canada").expect("canada");
    let mexico = catalog.get("ieepa_mexico").expect("mexico");

    let crude = code("2709.00.10");
    let potash = code("3104.20.00");
    let machines = code("8471.30.01");

    assert_eq!(canada.rate_for(&crude), 10.0);
    assert_eq!(canada.rate_for(&potash), 10.0);
    assert_eq!(canada.rate_for(&machines), 25.0);
    assert_eq!(mexico.rate_for(&crude), 25.0);
    assert_eq!(mexico.rate_for(&potash), 10.0);
}

#[test]
fn fentanyl_exempts_chapter_98_only() {
    let catalog = RuleCatalog::builtin();
    let fentanyl = catalog.get("fentanyl_china").expect("fentanyl");
    assert!(!fentanyl.covers(&code("9801.00.10")));
    assert!(fentanyl.covers(&code("3004.90.92")));
    assert!(fentanyl.expires.is_none());
}
