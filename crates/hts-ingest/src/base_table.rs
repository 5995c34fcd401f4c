//! Streaming reader for the base tariff schedule.
//!
//! Headers are normalized to snake case, so `HTS8`, `HTS Number` and
//! `hts_8` all identify the code column. Unknown columns are ignored.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecordsIntoIter};
use hts_model::{FtaProgram, TariffRow};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::header::{clean_cell, normalize_header};

/// Code column names in lookup order.
pub const CODE_COLUMNS: [&str; 3] = ["hts8", "hts_number", "hts_8"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Code,
    BriefDescription,
    Description,
    Quantity1Code,
    Quantity2Code,
    WtoBindingCode,
    MfnTextRate,
    MfnRateTypeCode,
    MfnAve,
    MfnAdValRate,
    MfnSpecificRate,
    MfnOtherRate,
    PharmaceuticalInd,
    DyesIndicator,
    Col2TextRate,
    Col2RateTypeCode,
    Col2AdValRate,
    Col2SpecificRate,
    Col2OtherRate,
    BeginEffectDate,
    EndEffectiveDate,
    FootnoteComment,
    AdditionalDuty,
    Program(FtaProgram, ProgramField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProgramField {
    Indicator,
    AdValRate,
    RateTypeCode,
    SpecificRate,
    OtherRate,
}

fn field_for(column: &str) -> Option<Field> {
    let field = match column {
        "brief_description" => Field::BriefDescription,
        "description" => Field::Description,
        "quantity_1_code" => Field::Quantity1Code,
        "quantity_2_code" => Field::Quantity2Code,
        "wto_binding_code" => Field::WtoBindingCode,
        "mfn_text_rate" => Field::MfnTextRate,
        "mfn_rate_type_code" => Field::MfnRateTypeCode,
        "mfn_ave" => Field::MfnAve,
        "mfn_ad_val_rate" => Field::MfnAdValRate,
        "mfn_specific_rate" => Field::MfnSpecificRate,
        "mfn_other_rate" => Field::MfnOtherRate,
        "pharmaceutical_ind" => Field::PharmaceuticalInd,
        "dyes_indicator" => Field::DyesIndicator,
        "col2_text_rate" => Field::Col2TextRate,
        "col2_rate_type_code" => Field::Col2RateTypeCode,
        "col2_ad_val_rate" => Field::Col2AdValRate,
        "col2_specific_rate" => Field::Col2SpecificRate,
        "col2_other_rate" => Field::Col2OtherRate,
        "begin_effect_date" => Field::BeginEffectDate,
        "end_effective_date" => Field::EndEffectiveDate,
        "footnote_comment" => Field::FootnoteComment,
        "additional_duty" => Field::AdditionalDuty,
        other => {
            let (program, suffix) = FtaProgram::split_column(other)?;
            let field = match suffix {
                "indicator" => ProgramField::Indicator,
                "ad_val_rate" => ProgramField::AdValRate,
                "rate_type_code" => ProgramField::RateTypeCode,
                "specific_rate" => ProgramField::SpecificRate,
                "other_rate" => ProgramField::OtherRate,
                _ => return None,
            };
            Field::Program(program, field)
        }
    };
    Some(field)
}

/// Map each header position to the field it fills. The first code column
/// found (in [`CODE_COLUMNS`] order) wins; other code columns are ignored.
fn map_columns(headers: &[String]) -> Vec<Option<Field>> {
    let code_index = CODE_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|header| header == name));
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            if Some(idx) == code_index {
                Some(Field::Code)
            } else if CODE_COLUMNS.contains(&header.as_str()) {
                None
            } else {
                field_for(header)
            }
        })
        .collect()
}

fn assign(row: &mut TariffRow, field: Field, value: String) {
    let slot = match field {
        Field::Code => &mut row.hts8,
        Field::BriefDescription => &mut row.brief_description,
        Field::Description => {
            if row.brief_description.is_none() {
                row.brief_description = Some(value);
            }
            return;
        }
        Field::Quantity1Code => &mut row.quantity_1_code,
        Field::Quantity2Code => &mut row.quantity_2_code,
        Field::WtoBindingCode => &mut row.wto_binding_code,
        Field::MfnTextRate => &mut row.mfn_text_rate,
        Field::MfnRateTypeCode => &mut row.mfn_rate_type_code,
        Field::MfnAve => &mut row.mfn_ave,
        Field::MfnAdValRate => &mut row.mfn_ad_val_rate,
        Field::MfnSpecificRate => &mut row.mfn_specific_rate,
        Field::MfnOtherRate => &mut row.mfn_other_rate,
        Field::PharmaceuticalInd => &mut row.pharmaceutical_ind,
        Field::DyesIndicator => &mut row.dyes_indicator,
        Field::Col2TextRate => &mut row.col2_text_rate,
        Field::Col2RateTypeCode => &mut row.col2_rate_type_code,
        Field::Col2AdValRate => &mut row.col2_ad_val_rate,
        Field::Col2SpecificRate => &mut row.col2_specific_rate,
        Field::Col2OtherRate => &mut row.col2_other_rate,
        Field::BeginEffectDate => &mut row.begin_effect_date,
        Field::EndEffectiveDate => &mut row.end_effective_date,
        Field::FootnoteComment => &mut row.footnote_comment,
        Field::AdditionalDuty => &mut row.additional_duty,
        Field::Program(program, field) => {
            let columns = row.program_mut(program);
            match field {
                ProgramField::Indicator => &mut columns.indicator,
                ProgramField::AdValRate => &mut columns.ad_val_rate,
                ProgramField::RateTypeCode => &mut columns.rate_type_code,
                ProgramField::SpecificRate => &mut columns.specific_rate,
                ProgramField::OtherRate => &mut columns.other_rate,
            }
        }
    };
    *slot = Some(value);
}

/// Row-at-a-time reader over a base schedule CSV.
pub struct BaseTableReader {
    path: PathBuf,
    headers: Vec<String>,
    columns: Vec<Option<Field>>,
    records: StringRecordsIntoIter<File>,
}

impl BaseTableReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| IngestError::open(path, e))?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| IngestError::csv(path, &e))?
            .iter()
            .map(normalize_header)
            .collect();
        let columns = map_columns(&headers);
        if !columns.contains(&Some(Field::Code)) {
            return Err(IngestError::MissingColumn {
                column: CODE_COLUMNS.join(" | "),
                path: path.to_path_buf(),
            });
        }
        let ignored: Vec<&str> = headers
            .iter()
            .zip(&columns)
            .filter(|(_, field)| field.is_none())
            .map(|(header, _)| header.as_str())
            .collect();
        if !ignored.is_empty() {
            debug!(path = %path.display(), ignored = ?ignored, "ignoring unknown columns");
        }
        Ok(Self {
            path: path.to_path_buf(),
            headers,
            columns,
            records: reader.into_records(),
        })
    }

    /// Normalized header names.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for BaseTableReader {
    type Item = Result<TariffRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(error) => return Some(Err(IngestError::csv(&self.path, &error))),
        };
        let mut row = TariffRow::default();
        for (value, field) in record.iter().zip(&self.columns) {
            let (Some(field), Some(value)) = (field, clean_cell(value)) else {
                continue;
            };
            assign(&mut row, *field, value);
        }
        Some(Ok(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_columns() {
        let headers: Vec<String> = ["hts8", "brief_description", "gsp_indicator", "nafta_mexico_ad_val_rate", "extra"]
            .iter()
            .map(|h| (*h).to_string())
            .collect();
        let columns = map_columns(&headers);
        assert_eq!(columns[0], Some(Field::Code));
        assert_eq!(columns[1], Some(Field::BriefDescription));
        assert_eq!(
            columns[2],
            Some(Field::Program(FtaProgram::Gsp, ProgramField::Indicator))
        );
        assert_eq!(
            columns[3],
            Some(Field::Program(FtaProgram::NaftaMexico, ProgramField::AdValRate))
        );
        assert_eq!(columns[4], None);
    }

    #[test]
    fn first_code_column_wins() {
        let headers: Vec<String> = ["hts_8", "hts8"].iter().map(|h| (*h).to_string()).collect();
        let columns = map_columns(&headers);
        assert_eq!(columns, vec![None, Some(Field::Code)]);
    }
}
