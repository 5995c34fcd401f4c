//! CLI argument definitions for the schedule builder.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "hts-schedule",
    version,
    about = "Build the consolidated US tariff additive-duty schedule",
    long_about = "Build the consolidated US tariff additive-duty schedule.\n\n\
                  Merges the HTS base schedule with Section 301, 232 and 201 duties\n\
                  and, on request, the IEEPA, reciprocal and fentanyl tariffs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Append logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a Section 301 list from extracted PDF text.
    ExtractList(ExtractListArgs),

    /// Concatenate per-list extraction tables.
    Combine(CombineArgs),

    /// Show codes that appear on more than one list.
    Analyze(AnalyzeArgs),

    /// Keep one controlling entry per code (latest list wins).
    Dedupe(DedupeArgs),

    /// Build the schedule document from the base schedule and list tables.
    Preprocess(PreprocessArgs),

    /// Print the revision label found in change-record text.
    Revision(RevisionArgs),

    /// Print the duty rule catalog.
    Rules(RulesArgs),
}

#[derive(Args)]
pub struct ExtractListArgs {
    /// Text produced by the PDF extractor.
    #[arg(value_name = "TEXT")]
    pub text: PathBuf,

    /// Output list table.
    #[arg(value_name = "OUT_CSV")]
    pub output: PathBuf,

    /// List identifier (1, 2, 3, 4a).
    #[arg(long = "list", value_name = "ID")]
    pub list: String,
}

#[derive(Args)]
pub struct CombineArgs {
    /// Directory holding `list*_hts_extracted.csv` (default: $HTS_DATA_DIR).
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Combined table (default: <DIR>/section301_combined.csv).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Combined list table.
    #[arg(value_name = "COMBINED_CSV")]
    pub input: PathBuf,

    /// Number of duplicate codes to list.
    #[arg(long = "top", value_name = "N", default_value_t = 20)]
    pub top: usize,
}

#[derive(Args)]
pub struct DedupeArgs {
    /// Combined list table.
    #[arg(value_name = "COMBINED_CSV")]
    pub input: PathBuf,

    /// Deduplicated list table.
    #[arg(value_name = "OUT_CSV")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct PreprocessArgs {
    /// Base schedule CSV.
    #[arg(value_name = "INPUT_CSV")]
    pub input: PathBuf,

    /// Deduplicated Section 301 list table.
    #[arg(value_name = "SECTION301_CSV")]
    pub section301: PathBuf,

    /// Schedule document to write.
    #[arg(value_name = "OUTPUT_JSON")]
    pub output: PathBuf,

    /// Revision label recorded in the document.
    #[arg(value_name = "HTS_REVISION")]
    pub hts_revision: Option<String>,

    /// Emit reciprocal, fentanyl and IEEPA duties.
    #[arg(long = "inject-extra-tariffs")]
    pub inject_extra_tariffs: bool,

    /// Keep only codes on a Section 301 list.
    #[arg(long = "section-301-only")]
    pub section_301_only: bool,

    /// Rule table replacing the built-in catalog.
    #[arg(long = "rules", value_name = "CSV")]
    pub rules: Option<PathBuf>,

    /// Section 201 lookup (default: section201_solar.csv beside SECTION301_CSV).
    #[arg(long = "section201", value_name = "CSV")]
    pub section201: Option<PathBuf>,

    /// Only apply rules in force on this date (YYYY-MM-DD).
    #[arg(long = "as-of", value_name = "DATE")]
    pub as_of: Option<String>,

    /// TOML run configuration; flags take precedence.
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct RevisionArgs {
    /// Change-record text.
    #[arg(value_name = "TEXT")]
    pub text: PathBuf,
}

#[derive(Args)]
pub struct RulesArgs {
    /// Rule table to show instead of the built-in catalog.
    #[arg(long = "rules", value_name = "CSV")]
    pub rules: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_preprocess_arguments() {
        let cli = Cli::try_parse_from([
            "hts-schedule",
            "preprocess",
            "tariff_database_2025.csv",
            "section301.csv",
            "schedule.json",
            "2025 Revision 17",
            "--inject-extra-tariffs",
            "--as-of",
            "2025-06-01",
        ])
        .expect("parse arguments");
        let Command::Preprocess(args) = cli.command else {
            panic!("expected preprocess");
        };
        assert_eq!(args.hts_revision.as_deref(), Some("2025 Revision 17"));
        assert!(args.inject_extra_tariffs);
        assert!(!args.section_301_only);
        assert_eq!(args.as_of.as_deref(), Some("2025-06-01"));
        assert!(args.config.is_none());
    }
}
