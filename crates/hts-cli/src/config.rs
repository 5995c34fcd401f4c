//! TOML run configuration for `preprocess`.
//!
//! Precedence: command-line flags, then the config file, then defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

/// Revision label used when none is given.
pub const UNKNOWN_REVISION: &str = "Unknown";

/// Section 201 lookup expected beside the Section 301 table.
pub const SECTION201_FILE_NAME: &str = "section201_solar.csv";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub hts_revision: Option<String>,
    pub inject_extra_tariffs: Option<bool>,
    pub section_301_only: Option<bool>,
    pub rules: Option<PathBuf>,
    pub section201: Option<PathBuf>,
    /// `YYYY-MM-DD`.
    pub as_of: Option<String>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read run config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parse run config {}", path.display()))
    }
}

/// Flag values as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct PreprocessFlags {
    pub hts_revision: Option<String>,
    pub inject_extra_tariffs: bool,
    pub section_301_only: bool,
    pub rules: Option<PathBuf>,
    pub section201: Option<PathBuf>,
    pub as_of: Option<String>,
}

/// Effective settings after merging flags, config and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreprocessSettings {
    pub hts_revision: String,
    pub inject_extra_tariffs: bool,
    pub section_301_only: bool,
    pub rules: Option<PathBuf>,
    pub section201: PathBuf,
    pub as_of: Option<NaiveDate>,
}

impl PreprocessSettings {
    /// Merge; `section301` locates the default Section 201 table.
    pub fn resolve(flags: PreprocessFlags, config: RunConfig, section301: &Path) -> Result<Self> {
        let as_of = flags
            .as_of
            .or(config.as_of)
            .map(|raw| parse_date(&raw))
            .transpose()?;
        let section201 = flags
            .section201
            .or(config.section201)
            .unwrap_or_else(|| section301.with_file_name(SECTION201_FILE_NAME));
        Ok(Self {
            hts_revision: flags
                .hts_revision
                .or(config.hts_revision)
                .unwrap_or_else(|| UNKNOWN_REVISION.to_string()),
            inject_extra_tariffs: flags.inject_extra_tariffs
                || config.inject_extra_tariffs.unwrap_or(false),
            section_301_only: flags.section_301_only || config.section_301_only.unwrap_or(false),
            rules: flags.rules.or(config.rules),
            section201,
            as_of,
        })
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date {raw:?}, expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let config: RunConfig = toml::from_str(
            r#"
            hts_revision = "2025 Revision 11"
            inject_extra_tariffs = true
            rules = "rules/duty_rules.csv"
            as_of = "2025-06-01"
            "#,
        )
        .expect("parse config");
        let flags = PreprocessFlags {
            hts_revision: Some("2025 Revision 17".to_string()),
            as_of: Some("2025-09-01".to_string()),
            ..PreprocessFlags::default()
        };
        let settings =
            PreprocessSettings::resolve(flags, config, Path::new("exports/section301.csv"))
                .expect("resolve");
        assert_eq!(settings.hts_revision, "2025 Revision 17");
        assert!(settings.inject_extra_tariffs);
        assert!(!settings.section_301_only);
        assert_eq!(settings.rules, Some(PathBuf::from("rules/duty_rules.csv")));
        assert_eq!(settings.as_of, NaiveDate::from_ymd_opt(2025, 9, 1));
        assert_eq!(
            settings.section201,
            PathBuf::from("exports/section201_solar.csv")
        );
    }

    #[test]
    fn defaults_without_config() {
        let settings = PreprocessSettings::resolve(
            PreprocessFlags::default(),
            RunConfig::default(),
            Path::new("section301.csv"),
        )
        .expect("resolve");
        assert_eq!(settings.hts_revision, UNKNOWN_REVISION);
        assert_eq!(settings.as_of, None);
        assert_eq!(settings.section201, PathBuf::from("section201_solar.csv"));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_dates() {
        assert!(toml::from_str::<RunConfig>("inject = true").is_err());
        assert!(parse_date("06/01/2025").is_err());
    }
}
