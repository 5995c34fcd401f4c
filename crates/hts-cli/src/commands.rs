use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{debug, info_span};

use hts_cli::config::{PreprocessFlags, PreprocessSettings, RunConfig};
use hts_cli::pipeline::{
    self, CombineResult, PreprocessRequest, PreprocessResult, load_catalog,
};
use hts_core::{DedupReport, DuplicateAnalysis};
use hts_standards::RuleCatalog;

use crate::cli::{
    AnalyzeArgs, CombineArgs, DedupeArgs, ExtractListArgs, PreprocessArgs, RevisionArgs,
    RulesArgs,
};

/// Environment variable naming the default data directory.
pub const DATA_DIR_ENV: &str = "HTS_DATA_DIR";

pub fn run_extract_list(args: &ExtractListArgs) -> Result<usize> {
    pipeline::extract_list(&args.text, &args.output, &args.list)
}

pub fn run_combine(args: &CombineArgs) -> Result<CombineResult> {
    let dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .with_context(|| format!("no directory given and {DATA_DIR_ENV} is not set"))?,
    };
    debug!(dir = %dir.display(), "combining list tables");
    pipeline::combine(&dir, args.output.clone())
}

pub fn run_analyze(args: &AnalyzeArgs) -> Result<DuplicateAnalysis> {
    pipeline::analyze(&args.input)
}

pub fn run_dedupe(args: &DedupeArgs) -> Result<DedupReport> {
    let span = info_span!("dedupe", input = %args.input.display());
    let _guard = span.enter();
    pipeline::dedupe(&args.input, &args.output)
}

pub fn run_preprocess(args: &PreprocessArgs) -> Result<PreprocessResult> {
    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let flags = PreprocessFlags {
        hts_revision: args.hts_revision.clone(),
        inject_extra_tariffs: args.inject_extra_tariffs,
        section_301_only: args.section_301_only,
        rules: args.rules.clone(),
        section201: args.section201.clone(),
        as_of: args.as_of.clone(),
    };
    let settings = PreprocessSettings::resolve(flags, config, &args.section301)?;
    debug!(?settings, "resolved preprocess settings");
    pipeline::preprocess(&PreprocessRequest {
        input: args.input.clone(),
        section301: args.section301.clone(),
        output: args.output.clone(),
        settings,
        generation_date: Local::now().date_naive(),
    })
}

pub fn run_revision(args: &RevisionArgs) -> Result<Option<String>> {
    pipeline::revision(&args.text)
}

pub fn run_rules(args: &RulesArgs) -> Result<RuleCatalog> {
    load_catalog(args.rules.as_deref())
}
