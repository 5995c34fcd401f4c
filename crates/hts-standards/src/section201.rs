//! Section 201 solar safeguard lookup.
//!
//! Columns: `HTS_Code, Current_Rate, Product_Type, Quota_GW, Exempt_Countries, Notes`.
//! Lines starting with `#` are comments.

use std::collections::BTreeMap;
use std::path::Path;

use hts_model::HtsCode;

use crate::csv_utils::read_csv_rows;
use crate::error::{Result, StandardsError};

/// Rate used when a row leaves `Current_Rate` blank.
pub const DEFAULT_SECTION_201_RATE: f64 = 14.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Section201Entry {
    pub rate: f64,
    pub product_type: String,
    pub quota_gw: Option<f64>,
    pub exempt_countries: Vec<String>,
    pub notes: Option<String>,
    pub original_code: String,
}

#[derive(Debug, Clone, Default)]
pub struct Section201Table {
    entries: BTreeMap<HtsCode, Section201Entry>,
}

impl Section201Table {
    pub fn get(&self, code: &HtsCode) -> Option<&Section201Entry> {
        self.entries.get(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn load_section201_table(path: &Path) -> Result<Section201Table> {
    let rows = read_csv_rows(path, &["HTS_Code"])?;
    let mut entries = BTreeMap::new();
    for row in rows {
        let Some(code) = HtsCode::parse(row.get("HTS_Code")) else {
            return Err(StandardsError::InvalidRow {
                path: path.to_path_buf(),
                line: row.line,
                message: format!("invalid HTS_Code: {:?}", row.get("HTS_Code")),
            });
        };
        let invalid_number = |column: &str| StandardsError::InvalidRow {
            path: path.to_path_buf(),
            line: row.line,
            message: format!("invalid {column}: {:?}", row.get(column)),
        };
        let rate = match row.optional("Current_Rate") {
            Some(raw) => raw
                .trim_end_matches('%')
                .parse::<f64>()
                .map_err(|_| invalid_number("Current_Rate"))?,
            None => DEFAULT_SECTION_201_RATE,
        };
        let quota_gw = row
            .optional("Quota_GW")
            .map(str::parse::<f64>)
            .transpose()
            .map_err(|_| invalid_number("Quota_GW"))?;
        let entry = Section201Entry {
            rate,
            product_type: row.optional("Product_Type").unwrap_or("solar").to_string(),
            quota_gw,
            exempt_countries: row
                .get("Exempt_Countries")
                .split([',', ';'])
                .map(str::trim)
                .filter(|country| !country.is_empty())
                .map(str::to_uppercase)
                .collect(),
            notes: row.optional("Notes").map(str::to_string),
            original_code: row.get("HTS_Code").to_string(),
        };
        entries.insert(code, entry);
    }
    Ok(Section201Table { entries })
}
