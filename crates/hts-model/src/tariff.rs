//! Base tariff rows and resolved schedule entries.

use serde::{Serialize, Serializer};

use crate::code::HtsCode;
use crate::duty::{DutyInstance, DutyKind};

/// Free-trade and preference programs carried as column groups in the
/// base schedule (`<key>_indicator`, `<key>_ad_val_rate`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FtaProgram {
    Gsp,
    NaftaCanada,
    NaftaMexico,
    Mexico,
    Cbi,
    Agoa,
    IsraelFta,
    Jordan,
    Singapore,
    Chile,
    Morocco,
    Australia,
    Bahrain,
    DrCafta,
    Oman,
    Peru,
    Korea,
    Colombia,
    Panama,
    Usmca,
}

impl FtaProgram {
    pub const ALL: [FtaProgram; 20] = [
        FtaProgram::Gsp,
        FtaProgram::NaftaCanada,
        FtaProgram::NaftaMexico,
        FtaProgram::Mexico,
        FtaProgram::Cbi,
        FtaProgram::Agoa,
        FtaProgram::IsraelFta,
        FtaProgram::Jordan,
        FtaProgram::Singapore,
        FtaProgram::Chile,
        FtaProgram::Morocco,
        FtaProgram::Australia,
        FtaProgram::Bahrain,
        FtaProgram::DrCafta,
        FtaProgram::Oman,
        FtaProgram::Peru,
        FtaProgram::Korea,
        FtaProgram::Colombia,
        FtaProgram::Panama,
        FtaProgram::Usmca,
    ];

    /// Column prefix in the base schedule.
    pub fn key(&self) -> &'static str {
        match self {
            FtaProgram::Gsp => "gsp",
            FtaProgram::NaftaCanada => "nafta_canada",
            FtaProgram::NaftaMexico => "nafta_mexico",
            FtaProgram::Mexico => "mexico",
            FtaProgram::Cbi => "cbi",
            FtaProgram::Agoa => "agoa",
            FtaProgram::IsraelFta => "israel_fta",
            FtaProgram::Jordan => "jordan",
            FtaProgram::Singapore => "singapore",
            FtaProgram::Chile => "chile",
            FtaProgram::Morocco => "morocco",
            FtaProgram::Australia => "australia",
            FtaProgram::Bahrain => "bahrain",
            FtaProgram::DrCafta => "dr_cafta",
            FtaProgram::Oman => "oman",
            FtaProgram::Peru => "peru",
            FtaProgram::Korea => "korea",
            FtaProgram::Colombia => "colombia",
            FtaProgram::Panama => "panama",
            FtaProgram::Usmca => "usmca",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FtaProgram::Gsp => "GSP",
            FtaProgram::NaftaCanada => "NAFTA Canada",
            FtaProgram::NaftaMexico => "NAFTA Mexico",
            FtaProgram::Mexico => "Mexico",
            FtaProgram::Cbi => "Caribbean Basin",
            FtaProgram::Agoa => "AGOA",
            FtaProgram::IsraelFta => "Israel FTA",
            FtaProgram::Jordan => "Jordan FTA",
            FtaProgram::Singapore => "Singapore FTA",
            FtaProgram::Chile => "Chile FTA",
            FtaProgram::Morocco => "Morocco FTA",
            FtaProgram::Australia => "Australia FTA",
            FtaProgram::Bahrain => "Bahrain FTA",
            FtaProgram::DrCafta => "CAFTA-DR",
            FtaProgram::Oman => "Oman FTA",
            FtaProgram::Peru => "Peru TPA",
            FtaProgram::Korea => "Korea FTA",
            FtaProgram::Colombia => "Colombia TPA",
            FtaProgram::Panama => "Panama TPA",
            FtaProgram::Usmca => "USMCA",
        }
    }

    /// Match a normalized column name such as `dr_cafta_ad_val_rate`,
    /// returning the program and the column suffix.
    pub fn split_column(column: &str) -> Option<(FtaProgram, &str)> {
        // `nafta_mexico` must win over `mexico`, so try longer keys first.
        let mut best: Option<(FtaProgram, &str)> = None;
        for program in FtaProgram::ALL {
            let Some(rest) = column
                .strip_prefix(program.key())
                .and_then(|rest| rest.strip_prefix('_'))
            else {
                continue;
            };
            if best.is_none_or(|(current, _)| program.key().len() > current.key().len()) {
                best = Some((program, rest));
            }
        }
        best
    }
}

impl Serialize for FtaProgram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// One base schedule row, every recognized column as read (trimmed, empty = `None`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TariffRow {
    pub hts8: Option<String>,
    pub brief_description: Option<String>,
    pub quantity_1_code: Option<String>,
    pub quantity_2_code: Option<String>,
    pub wto_binding_code: Option<String>,
    pub mfn_text_rate: Option<String>,
    pub mfn_rate_type_code: Option<String>,
    pub mfn_ave: Option<String>,
    pub mfn_ad_val_rate: Option<String>,
    pub mfn_specific_rate: Option<String>,
    pub mfn_other_rate: Option<String>,
    pub pharmaceutical_ind: Option<String>,
    pub dyes_indicator: Option<String>,
    pub col2_text_rate: Option<String>,
    pub col2_rate_type_code: Option<String>,
    pub col2_ad_val_rate: Option<String>,
    pub col2_specific_rate: Option<String>,
    pub col2_other_rate: Option<String>,
    pub begin_effect_date: Option<String>,
    pub end_effective_date: Option<String>,
    pub footnote_comment: Option<String>,
    pub additional_duty: Option<String>,
    pub programs: Vec<ProgramColumns>,
}

impl TariffRow {
    pub fn program_mut(&mut self, program: FtaProgram) -> &mut ProgramColumns {
        let index = match self.programs.iter().position(|p| p.program == program) {
            Some(index) => index,
            None => {
                self.programs.push(ProgramColumns::new(program));
                self.programs.len() - 1
            }
        };
        &mut self.programs[index]
    }
}

/// Raw column group for one FTA program.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramColumns {
    pub program: FtaProgram,
    pub indicator: Option<String>,
    pub ad_val_rate: Option<String>,
    pub rate_type_code: Option<String>,
    pub specific_rate: Option<String>,
    pub other_rate: Option<String>,
}

impl ProgramColumns {
    pub fn new(program: FtaProgram) -> Self {
        Self {
            program,
            indicator: None,
            ad_val_rate: None,
            rate_type_code: None,
            specific_rate: None,
            other_rate: None,
        }
    }
}

/// Cleaned FTA program rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramRates {
    pub program: FtaProgram,
    pub program_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_val_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_rate: Option<String>,
}

impl ProgramRates {
    /// Programs with an indicator and a usable ad-valorem rate.
    pub fn is_available(&self) -> bool {
        self.indicator.is_some() && self.ad_val_rate.is_some()
    }
}

/// A base schedule row after cleaning: typed rates, named optional fields.
///
/// Rates are fractions as published (`0.25` is 25 %).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseTariffEntry {
    /// Code digits as published (leading zeros kept).
    pub hts8: String,
    pub brief_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_1_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_2_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wto_binding_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfn_text_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfn_rate_type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfn_ave: Option<String>,
    pub mfn_ad_val_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfn_specific_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfn_other_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pharmaceutical_ind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dyes_indicator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col2_text_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col2_rate_type_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col2_ad_val_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col2_specific_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col2_other_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_effect_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_effective_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footnote_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_duty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_duty_rate: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub programs: Vec<ProgramRates>,
}

impl BaseTariffEntry {
    /// Minimal entry; used by tests and by callers building rows by hand.
    pub fn new(hts8: &str, description: &str) -> Self {
        Self {
            hts8: hts8.to_string(),
            brief_description: description.to_string(),
            quantity_1_code: None,
            quantity_2_code: None,
            wto_binding_code: None,
            mfn_text_rate: None,
            mfn_rate_type_code: None,
            mfn_ave: None,
            mfn_ad_val_rate: 0.0,
            mfn_specific_rate: None,
            mfn_other_rate: None,
            pharmaceutical_ind: None,
            dyes_indicator: None,
            col2_text_rate: None,
            col2_rate_type_code: None,
            col2_ad_val_rate: None,
            col2_specific_rate: None,
            col2_other_rate: None,
            begin_effect_date: None,
            end_effective_date: None,
            footnote_comment: None,
            additional_duty: None,
            additional_duty_rate: None,
            programs: Vec::new(),
        }
    }
}

/// Kind of Chapter 99 provision recognized from the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Chapter99Type {
    #[serde(rename = "Canada Special")]
    CanadaSpecial,
    #[serde(rename = "Aluminum/Steel")]
    AluminumSteel,
}

/// FTA program offered for an entry, as listed in the output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableProgram {
    pub program_key: &'static str,
    pub program_name: &'static str,
    pub rate: f64,
}

/// A base entry enriched with its resolved duty schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEntry {
    #[serde(flatten)]
    pub base: BaseTariffEntry,
    pub normalized_code: HtsCode,
    pub is_chapter_99: bool,
    pub is_special_provision: bool,
    pub has_trade_action: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_99_additional_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_99_duty_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_99_type: Option<Chapter99Type>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_301_list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_301_rate: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ntr_suspended_countries: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub column2_countries: Vec<String>,
    pub available_programs: Vec<AvailableProgram>,
    pub duties: Vec<DutyInstance>,
}

impl ResolvedEntry {
    pub fn duties_of(&self, kind: DutyKind) -> impl Iterator<Item = &DutyInstance> {
        self.duties.iter().filter(move |duty| duty.kind == kind)
    }

    pub fn has_duty(&self, kind: DutyKind) -> bool {
        self.duties_of(kind).next().is_some()
    }

    pub fn has_extra_tariff(&self) -> bool {
        self.duties.iter().any(|duty| duty.kind.is_extra_tariff())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_program_columns() {
        assert_eq!(
            FtaProgram::split_column("nafta_mexico_ad_val_rate"),
            Some((FtaProgram::NaftaMexico, "ad_val_rate"))
        );
        assert_eq!(
            FtaProgram::split_column("mexico_indicator"),
            Some((FtaProgram::Mexico, "indicator"))
        );
        assert_eq!(
            FtaProgram::split_column("dr_cafta_rate_type_code"),
            Some((FtaProgram::DrCafta, "rate_type_code"))
        );
        assert_eq!(FtaProgram::split_column("mfn_ad_val_rate"), None);
    }

    #[test]
    fn program_mut_reuses_group() {
        let mut row = TariffRow::default();
        row.program_mut(FtaProgram::Gsp).indicator = Some("A".to_string());
        row.program_mut(FtaProgram::Gsp).ad_val_rate = Some("0".to_string());
        assert_eq!(row.programs.len(), 1);
        assert_eq!(row.programs[0].indicator.as_deref(), Some("A"));
    }
}
