//! Duty categories, country scopes and resolved duty instances.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

use crate::code::HtsCode;
use crate::error::ModelError;

/// Closed set of additive-duty programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DutyKind {
    #[serde(rename = "section_232")]
    Section232,
    #[serde(rename = "section_301")]
    Section301,
    #[serde(rename = "section_201")]
    Section201,
    #[serde(rename = "ieepa")]
    Ieepa,
    #[serde(rename = "reciprocal_china")]
    ReciprocalChina,
    #[serde(rename = "fentanyl_china")]
    FentanylChina,
    #[serde(rename = "trade_action")]
    TradeAction,
}

impl DutyKind {
    pub const ALL: [DutyKind; 7] = [
        DutyKind::Section232,
        DutyKind::Section301,
        DutyKind::Section201,
        DutyKind::Ieepa,
        DutyKind::ReciprocalChina,
        DutyKind::FentanylChina,
        DutyKind::TradeAction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DutyKind::Section232 => "section_232",
            DutyKind::Section301 => "section_301",
            DutyKind::Section201 => "section_201",
            DutyKind::Ieepa => "ieepa",
            DutyKind::ReciprocalChina => "reciprocal_china",
            DutyKind::FentanylChina => "fentanyl_china",
            DutyKind::TradeAction => "trade_action",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DutyKind::Section232 => "Section 232",
            DutyKind::Section301 => "Section 301",
            DutyKind::Section201 => "Section 201",
            DutyKind::Ieepa => "IEEPA",
            DutyKind::ReciprocalChina => "Reciprocal (China)",
            DutyKind::FentanylChina => "Fentanyl (China)",
            DutyKind::TradeAction => "Trade action",
        }
    }

    /// Country-scoped emergency duties that are only injected on request.
    pub fn is_extra_tariff(&self) -> bool {
        matches!(
            self,
            DutyKind::Ieepa | DutyKind::ReciprocalChina | DutyKind::FentanylChina
        )
    }
}

impl fmt::Display for DutyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DutyKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "section_232" | "section232" => Ok(DutyKind::Section232),
            "section_301" | "section301" => Ok(DutyKind::Section301),
            "section_201" | "section201" => Ok(DutyKind::Section201),
            "ieepa" => Ok(DutyKind::Ieepa),
            "reciprocal" | "reciprocal_china" => Ok(DutyKind::ReciprocalChina),
            "fentanyl" | "fentanyl_china" => Ok(DutyKind::FentanylChina),
            "trade_action" => Ok(DutyKind::TradeAction),
            _ => Err(ModelError::UnknownDutyKind(s.to_string())),
        }
    }
}

/// Product families recognized by fixed prefix or chapter tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Steel,
    Aluminum,
    Energy,
    Potash,
    Solar,
}

const SOLAR_PREFIXES: &[&str] = &[
    "854142",   // photovoltaic cells not assembled in modules
    "854143",   // photovoltaic cells assembled in modules
    "85013180", // DC generators with CSPV cells
    "85016100", // AC generators with CSPV cells
    "85072080", // lead-acid batteries with CSPV cells
];

const POTASH_PREFIXES: &[&str] = &["310420", "310520"];

impl ProductType {
    pub fn matches(&self, code: &HtsCode) -> bool {
        match self {
            ProductType::Steel => matches!(code.chapter(), "72" | "73"),
            ProductType::Aluminum => code.chapter() == "76",
            ProductType::Energy => code.chapter() == "27",
            ProductType::Potash => POTASH_PREFIXES.iter().any(|p| code.has_prefix(p)),
            ProductType::Solar => SOLAR_PREFIXES.iter().any(|p| code.has_prefix(p)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Steel => "steel",
            ProductType::Aluminum => "aluminum",
            ProductType::Energy => "energy",
            ProductType::Potash => "potash",
            ProductType::Solar => "solar",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "steel" => Ok(ProductType::Steel),
            "aluminum" | "aluminium" => Ok(ProductType::Aluminum),
            "energy" => Ok(ProductType::Energy),
            "potash" => Ok(ProductType::Potash),
            "solar" => Ok(ProductType::Solar),
            _ => Err(ModelError::UnknownProductType(s.to_string())),
        }
    }
}

/// Countries a duty applies to. Serializes as `"all"` or a list of codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryScope {
    All,
    Only(Vec<String>),
}

impl CountryScope {
    /// Parse `all`/`global` or a `;`/`,` separated list of country codes.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("all")
            || trimmed.eq_ignore_ascii_case("global")
        {
            return CountryScope::All;
        }
        CountryScope::Only(split_list(trimmed).map(str::to_uppercase).collect())
    }

    pub fn only<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CountryScope::Only(codes.into_iter().map(Into::into).collect())
    }

    pub fn includes(&self, country: &str) -> bool {
        match self {
            CountryScope::All => true,
            CountryScope::Only(codes) => codes.iter().any(|c| c.eq_ignore_ascii_case(country)),
        }
    }
}

impl fmt::Display for CountryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountryScope::All => f.write_str("all"),
            CountryScope::Only(codes) => f.write_str(&codes.join(", ")),
        }
    }
}

impl Serialize for CountryScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CountryScope::All => serializer.serialize_str("all"),
            CountryScope::Only(codes) => {
                let mut seq = serializer.serialize_seq(Some(codes.len()))?;
                for code in codes {
                    seq.serialize_element(code)?;
                }
                seq.end()
            }
        }
    }
}

/// Split a `;` or `,` separated cell into trimmed, non-empty items.
pub(crate) fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([';', ','])
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// One additive duty resolved for one code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DutyInstance {
    #[serde(rename = "type")]
    pub kind: DutyKind,
    /// Catalog rule that produced this instance.
    pub rule: String,
    pub name: String,
    pub label: String,
    /// Additional duty in percent.
    pub rate: f64,
    pub countries: CountryScope,
    /// Country-specific rates overriding `rate`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub country_rates: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provision_codes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_countries: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_status: Option<String>,
}

impl DutyInstance {
    /// Bare instance; callers fill in the optional metadata.
    pub fn new(kind: DutyKind, rule: &str, name: &str, label: String, rate: f64) -> Self {
        Self {
            kind,
            rule: rule.to_string(),
            name: name.to_string(),
            label,
            rate,
            countries: CountryScope::All,
            country_rates: BTreeMap::new(),
            provision_codes: Vec::new(),
            excluded_countries: Vec::new(),
            list: None,
            product_type: None,
            effective: None,
            expires: None,
            note: None,
            legal_status: None,
        }
    }

    /// Rate charged for goods from `country`.
    pub fn rate_for(&self, country: &str) -> Option<f64> {
        if !self.countries.includes(country)
            || self
                .excluded_countries
                .iter()
                .any(|c| c.eq_ignore_ascii_case(country))
        {
            return None;
        }
        let override_rate = self
            .country_rates
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(country))
            .map(|(_, rate)| *rate);
        Some(override_rate.unwrap_or(self.rate))
    }
}

/// Format a percentage without a trailing `.0` (`25`, `7.5`, `14.25`).
pub fn format_percent(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{rate:.0}%")
    } else {
        format!("{rate}%")
    }
}
