//! Country to trade-program mapping carried in the output document.

use std::collections::BTreeMap;

use serde::Serialize;

/// Countries whose Normal Trade Relations are suspended (Column 2 applies).
pub const NTR_SUSPENDED_COUNTRIES: &[&str] = &["RU", "BY"];

/// Countries traditionally charged the Column 2 rate.
pub const COLUMN2_COUNTRIES: &[&str] = &["CU", "KP"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryProgram {
    pub code: &'static str,
    pub name: &'static str,
    pub programs: Vec<&'static str>,
}

const COUNTRY_PROGRAMS: &[(&str, &str, &[&str])] = &[
    ("CA", "Canada", &["USMCA", "NAFTA"]),
    ("MX", "Mexico", &["USMCA", "NAFTA"]),
    ("AU", "Australia", &["Australia FTA"]),
    ("BH", "Bahrain", &["Bahrain FTA"]),
    ("CL", "Chile", &["Chile FTA"]),
    ("CO", "Colombia", &["Colombia TPA"]),
    ("CR", "Costa Rica", &["CAFTA-DR"]),
    ("DO", "Dominican Republic", &["CAFTA-DR"]),
    ("SV", "El Salvador", &["CAFTA-DR"]),
    ("GT", "Guatemala", &["CAFTA-DR"]),
    ("HN", "Honduras", &["CAFTA-DR"]),
    ("NI", "Nicaragua", &["CAFTA-DR"]),
    ("IL", "Israel", &["Israel FTA"]),
    ("JO", "Jordan", &["Jordan FTA"]),
    ("KR", "Korea", &["Korea FTA"]),
    ("MA", "Morocco", &["Morocco FTA"]),
    ("OM", "Oman", &["Oman FTA"]),
    ("PA", "Panama", &["Panama TPA"]),
    ("PE", "Peru", &["Peru TPA"]),
    ("SG", "Singapore", &["Singapore FTA"]),
    ("JP", "Japan", &["Japan Agreement"]),
    // Special program indicators
    ("A+", "GSP Least Developed", &["GSP", "GSP+"]),
    ("A", "GSP", &["GSP"]),
    ("E", "CBERA", &["Caribbean Basin"]),
    ("J", "ATPA", &["Andean Trade"]),
    ("D", "AGOA", &["Africa Growth"]),
    // Countries with special duties
    ("CN", "China", &["Section 301", "Reciprocal Tariff"]),
    ("RU", "Russia", &["Column 2 - NTR Suspended"]),
    ("BY", "Belarus", &["Column 2 - NTR Suspended"]),
];

/// Full mapping keyed by country (or program indicator) code.
pub fn country_programs() -> BTreeMap<&'static str, CountryProgram> {
    COUNTRY_PROGRAMS
        .iter()
        .map(|&(code, name, programs)| {
            (
                code,
                CountryProgram {
                    code,
                    name,
                    programs: programs.to_vec(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_covers_partners_and_special_duty_countries() {
        let programs = country_programs();
        assert_eq!(programs.len(), COUNTRY_PROGRAMS.len());
        assert_eq!(programs["CA"].programs, vec!["USMCA", "NAFTA"]);
        assert_eq!(programs["CN"].name, "China");
        for code in NTR_SUSPENDED_COUNTRIES {
            assert!(programs.contains_key(code));
        }
    }
}
