//! Declarative additive-duty rules.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::code::{HtsCode, digits_only};
use crate::duty::{CountryScope, DutyKind, ProductType, split_list};
use crate::error::ModelError;

/// Which codes a rule (or an exemption) covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "data_type", content = "value", rename_all = "snake_case")]
pub enum Applicability {
    All,
    #[serde(rename = "chapter")]
    Chapters(BTreeSet<String>),
    #[serde(rename = "prefix")]
    Prefixes(Vec<String>),
    #[serde(rename = "hts_code")]
    Codes(BTreeSet<HtsCode>),
    ProductType(ProductType),
}

impl Applicability {
    /// Build from a rule-table `AppliesTo_DataType` / `AppliesTo_Value` pair.
    pub fn parse(data_type: &str, value: &str) -> Result<Self, ModelError> {
        let kind = data_type.trim().to_lowercase().replace([' ', '-'], "_");
        let applicability = match kind.as_str() {
            "all" | "" => return Ok(Applicability::All),
            "chapter" | "chapters" => {
                let mut chapters = BTreeSet::new();
                for item in split_list(value) {
                    let digits = digits_only(item);
                    if digits.is_empty() || digits.len() > 2 {
                        return Err(ModelError::InvalidChapter(item.to_string()));
                    }
                    chapters.insert(format!("{digits:0>2}"));
                }
                Applicability::Chapters(chapters)
            }
            "prefix" | "hts_prefix" => Applicability::Prefixes(
                split_list(value)
                    .map(digits_only)
                    .filter(|p| !p.is_empty())
                    .collect(),
            ),
            "hts_code" | "code" | "hts8" => Applicability::Codes(
                split_list(value).filter_map(HtsCode::parse).collect(),
            ),
            "product_type" => Applicability::ProductType(value.parse()?),
            _ => return Err(ModelError::UnknownDataType(data_type.to_string())),
        };
        if applicability.is_empty() {
            return Err(ModelError::EmptyApplicability {
                data_type: kind,
            });
        }
        Ok(applicability)
    }

    pub fn chapters<I, S>(chapters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Applicability::Chapters(chapters.into_iter().map(Into::into).collect())
    }

    pub fn prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Applicability::Prefixes(
            prefixes
                .into_iter()
                .map(|p| digits_only(p.as_ref()))
                .collect(),
        )
    }

    pub fn matches(&self, code: &HtsCode) -> bool {
        match self {
            Applicability::All => true,
            Applicability::Chapters(chapters) => chapters.contains(code.chapter()),
            Applicability::Prefixes(prefixes) => prefixes.iter().any(|p| code.has_prefix(p)),
            Applicability::Codes(codes) => codes.contains(code),
            Applicability::ProductType(product) => product.matches(code),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Applicability::All | Applicability::ProductType(_) => false,
            Applicability::Chapters(chapters) => chapters.is_empty(),
            Applicability::Prefixes(prefixes) => prefixes.is_empty(),
            Applicability::Codes(codes) => codes.is_empty(),
        }
    }
}

impl fmt::Display for Applicability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Applicability::All => f.write_str("all codes"),
            Applicability::Chapters(chapters) => {
                let list: Vec<&str> = chapters.iter().map(String::as_str).collect();
                write!(f, "chapter {}", list.join(", "))
            }
            Applicability::Prefixes(prefixes) => write!(f, "prefix {}", prefixes.join(", ")),
            Applicability::Codes(codes) => {
                let list: Vec<&str> = codes.iter().map(HtsCode::as_str).collect();
                write!(f, "code {}", list.join(", "))
            }
            Applicability::ProductType(product) => write!(f, "{product} products"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RuleStatus {
    #[default]
    Active,
    Inactive,
}

impl FromStr for RuleStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "active" => Ok(RuleStatus::Active),
            "inactive" => Ok(RuleStatus::Inactive),
            _ => Err(ModelError::UnknownStatus(s.to_string())),
        }
    }
}

/// Lower rate for specific product families (e.g. energy and potash).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReducedRate {
    pub rate: f64,
    pub product_types: Vec<ProductType>,
}

/// One additive-duty program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DutyRule {
    /// Stable lookup key (`section_232_steel`).
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DutyKind,
    /// Display title (`Section 232 - Steel`).
    pub title: String,
    pub applies_to: Applicability,
    pub countries: CountryScope,
    /// Additional duty in percent.
    pub rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reduced_rate: Option<ReducedRate>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub country_rates: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provision_codes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_countries: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exemptions: Vec<Applicability>,
    pub effective: Option<NaiveDate>,
    pub expires: Option<NaiveDate>,
    pub status: RuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_status: Option<String>,
}

impl DutyRule {
    pub fn new(name: &str, kind: DutyKind, title: &str, applies_to: Applicability, rate: f64) -> Self {
        Self {
            name: name.to_string(),
            kind,
            title: title.to_string(),
            applies_to,
            countries: CountryScope::All,
            rate,
            reduced_rate: None,
            country_rates: BTreeMap::new(),
            provision_codes: Vec::new(),
            excluded_countries: Vec::new(),
            exemptions: Vec::new(),
            effective: None,
            expires: None,
            status: RuleStatus::Active,
            note: None,
            legal_status: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RuleStatus::Active
    }

    /// Active, already effective and not yet expired on `date`.
    pub fn in_force_on(&self, date: NaiveDate) -> bool {
        self.is_active()
            && self.effective.is_none_or(|effective| effective <= date)
            && self.expires.is_none_or(|expires| date <= expires)
    }

    pub fn is_exempt(&self, code: &HtsCode) -> bool {
        self.exemptions.iter().any(|exemption| exemption.matches(code))
    }

    /// Covered by the rule's predicate and not carved out by an exemption.
    pub fn covers(&self, code: &HtsCode) -> bool {
        self.applies_to.matches(code) && !self.is_exempt(code)
    }

    /// Rate for `code`, applying the reduced rate for listed product families.
    pub fn rate_for(&self, code: &HtsCode) -> f64 {
        self.reduced_product(code)
            .and_then(|_| self.reduced_rate.as_ref())
            .map_or(self.rate, |reduced| reduced.rate)
    }

    /// Product family that earned the reduced rate, if any.
    pub fn reduced_product(&self, code: &HtsCode) -> Option<ProductType> {
        self.reduced_rate.as_ref().and_then(|reduced| {
            reduced
                .product_types
                .iter()
                .copied()
                .find(|product| product.matches(code))
        })
    }
}
