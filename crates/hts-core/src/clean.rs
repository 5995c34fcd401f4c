//! Base-row cleaning: raw cells to a typed [`BaseTariffEntry`].

use std::sync::LazyLock;

use hts_model::{BaseTariffEntry, HtsCode, ProgramRates, TariffRow, digits_only};
use regex::Regex;
use tracing::trace;

/// Rate cells at or above this value are indicator sentinels, not rates.
pub const SENTINEL_RATE: f64 = 1000.0;

static ADDITIONAL_DUTY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+\s*(\d+(?:\.\d+)?)\s*%").expect("Invalid additional duty regex")
});

/// Percentage in a clause such as `The duty provided in the applicable subheading + 25%`.
pub fn parse_additional_duty(text: &str) -> Option<f64> {
    ADDITIONAL_DUTY_REGEX
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|number| number.as_str().parse().ok())
}

/// A cleaned row with its comparison key.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRow {
    pub code: HtsCode,
    pub entry: BaseTariffEntry,
    /// Numeric cells that failed to parse and were treated as zero.
    pub degraded: usize,
}

/// Clean one row. `None` when the row carries no code digits.
pub fn clean_row(row: TariffRow) -> Option<CleanedRow> {
    let raw_code = row.hts8?;
    let hts8 = digits_only(&raw_code);
    if hts8.is_empty() {
        return None;
    }
    let code = HtsCode::normalize(&hts8);
    let mut degraded = 0;
    let mut rate = |raw: Option<String>, column: &str| -> Option<f64> {
        let raw = raw?;
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                trace!(code = %hts8, column, value = %raw, "unparsable rate treated as zero");
                degraded += 1;
                None
            }
        }
    };

    let mfn_ad_val_rate = rate(row.mfn_ad_val_rate, "mfn_ad_val_rate").unwrap_or(0.0);
    let mfn_specific_rate = below_sentinel(rate(row.mfn_specific_rate, "mfn_specific_rate"));
    let mfn_other_rate = below_sentinel(rate(row.mfn_other_rate, "mfn_other_rate"));
    let col2_ad_val_rate = below_sentinel(rate(row.col2_ad_val_rate, "col2_ad_val_rate"));
    let col2_specific_rate = below_sentinel(rate(row.col2_specific_rate, "col2_specific_rate"));
    let col2_other_rate = below_sentinel(rate(row.col2_other_rate, "col2_other_rate"));

    let mut programs = Vec::with_capacity(row.programs.len());
    for columns in row.programs {
        let ad_val_rate = below_sentinel(rate(columns.ad_val_rate, columns.program.key()));
        programs.push(ProgramRates {
            program: columns.program,
            program_name: columns.program.display_name(),
            indicator: columns.indicator,
            ad_val_rate,
            rate_type_code: columns.rate_type_code,
            specific_rate: columns.specific_rate,
            other_rate: columns.other_rate,
        });
    }
    programs.sort_by_key(|rates| rates.program);

    let additional_duty_rate = row.additional_duty.as_deref().and_then(parse_additional_duty);

    let entry = BaseTariffEntry {
        hts8,
        brief_description: row.brief_description.unwrap_or_default(),
        quantity_1_code: row.quantity_1_code,
        quantity_2_code: row.quantity_2_code,
        wto_binding_code: row.wto_binding_code,
        mfn_text_rate: row.mfn_text_rate,
        mfn_rate_type_code: row.mfn_rate_type_code,
        mfn_ave: row.mfn_ave,
        mfn_ad_val_rate,
        mfn_specific_rate,
        mfn_other_rate,
        pharmaceutical_ind: row.pharmaceutical_ind,
        dyes_indicator: row.dyes_indicator,
        col2_text_rate: row.col2_text_rate,
        col2_rate_type_code: row.col2_rate_type_code,
        col2_ad_val_rate,
        col2_specific_rate,
        col2_other_rate,
        begin_effect_date: row.begin_effect_date,
        end_effective_date: row.end_effective_date,
        footnote_comment: row.footnote_comment,
        additional_duty: row.additional_duty,
        additional_duty_rate,
        programs,
    };
    Some(CleanedRow {
        code,
        entry,
        degraded,
    })
}

fn below_sentinel(value: Option<f64>) -> Option<f64> {
    value.filter(|value| *value < SENTINEL_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hts_model::FtaProgram;

    #[test]
    fn parses_additional_duty_clauses() {
        assert_eq!(
            parse_additional_duty("The duty provided in the applicable subheading + 25%"),
            Some(25.0)
        );
        assert_eq!(parse_additional_duty("Free +7.5 %"), Some(7.5));
        assert_eq!(parse_additional_duty("25%"), None);
        assert_eq!(parse_additional_duty(""), None);
    }

    #[test]
    fn rows_without_digits_are_dropped() {
        assert!(clean_row(TariffRow::default()).is_none());
        let row = TariffRow {
            hts8: Some("n/a".to_string()),
            ..TariffRow::default()
        };
        assert!(clean_row(row).is_none());
    }

    #[test]
    fn cleans_rates_and_counts_degraded_values() {
        let mut row = TariffRow {
            hts8: Some("\u{feff}0101.21.00".to_string()),
            brief_description: Some("Purebred breeding horses".to_string()),
            mfn_ad_val_rate: Some("abc".to_string()),
            mfn_specific_rate: Some("9999.999999".to_string()),
            col2_ad_val_rate: Some("0.25".to_string()),
            col2_other_rate: Some("?".to_string()),
            additional_duty: Some("Canadian lumber + 14.38%".to_string()),
            ..TariffRow::default()
        };
        row.program_mut(FtaProgram::Korea).indicator = Some("KR".to_string());
        row.program_mut(FtaProgram::Korea).ad_val_rate = Some("0".to_string());
        row.program_mut(FtaProgram::Gsp).indicator = Some("A".to_string());

        let cleaned = clean_row(row).expect("cleaned row");
        assert_eq!(cleaned.entry.hts8, "01012100");
        assert_eq!(cleaned.code.as_str(), "10121000");
        assert_eq!(cleaned.entry.mfn_ad_val_rate, 0.0);
        assert_eq!(cleaned.entry.mfn_specific_rate, None);
        assert_eq!(cleaned.entry.col2_ad_val_rate, Some(0.25));
        assert_eq!(cleaned.degraded, 2);
        assert_eq!(cleaned.entry.additional_duty_rate, Some(14.38));
        assert_eq!(cleaned.entry.programs[0].program, FtaProgram::Gsp);
        assert!(!cleaned.entry.programs[0].is_available());
        assert!(cleaned.entry.programs[1].is_available());
    }

    #[test]
    fn keeps_sentinel_mfn_for_special_provision_detection() {
        let row = TariffRow {
            hts8: Some("99038001".to_string()),
            mfn_ad_val_rate: Some("9999.999999".to_string()),
            ..TariffRow::default()
        };
        let cleaned = clean_row(row).expect("cleaned row");
        assert_eq!(cleaned.entry.mfn_ad_val_rate, 9999.999999);
        assert_eq!(cleaned.degraded, 0);
    }
}
