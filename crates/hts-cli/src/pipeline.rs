//! Subcommand workflows. Each function reads its inputs, runs one stage and
//! writes its output atomically; printing is left to the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use hts_core::{
    CombinedLists, DedupReport, DuplicateAnalysis, DutyResolver, ResolverContext,
    ResolverOptions, RunDescription, ScheduleAssembler, ScheduleDocument, ScheduleStats,
    analyze_duplicates, combine_lists, deduplicate,
};
use hts_ingest::{
    BaseTableReader, extract_list_entries, extract_revision, list_extracted_files,
    read_list_table, write_list_table,
};
use hts_model::{ListEntry, Section301List};
use hts_report::{fingerprint, write_atomic, write_json_atomic};
use hts_standards::{
    RuleCatalog, Section201Table, Section301Table, load_rule_table, load_section201_table,
};
use tracing::{info, info_span, warn};

use crate::config::PreprocessSettings;

/// Default combined table name inside the data directory.
pub const COMBINED_FILE_NAME: &str = "section301_combined.csv";

pub fn write_list_csv(path: &Path, entries: &[ListEntry]) -> Result<()> {
    write_atomic(path, |writer| write_list_table(writer, entries))
        .with_context(|| format!("write list table {}", path.display()))
}

pub fn extract_list(text_path: &Path, output: &Path, list: &str) -> Result<usize> {
    let list = Section301List::parse(list);
    if list.priority() == 0 {
        warn!(list = %list, "unrecognized list identifier; entries will carry no rate");
    }
    let text = fs::read_to_string(text_path)
        .with_context(|| format!("read list text {}", text_path.display()))?;
    let entries = extract_list_entries(&text, &list);
    if entries.is_empty() {
        warn!(path = %text_path.display(), "no codes found in list text");
    }
    write_list_csv(output, &entries)?;
    info!(list = %list, row_count = entries.len(), "extracted list");
    Ok(entries.len())
}

pub struct CombineResult {
    pub output: PathBuf,
    pub files: Vec<PathBuf>,
    pub combined: CombinedLists,
}

pub fn combine(dir: &Path, output: Option<PathBuf>) -> Result<CombineResult> {
    let files = list_extracted_files(dir)
        .with_context(|| format!("list extraction tables in {}", dir.display()))?;
    if files.is_empty() {
        bail!("no list*_hts_extracted.csv files in {}", dir.display());
    }
    let mut tables = Vec::with_capacity(files.len());
    for file in &files {
        let entries =
            read_list_table(file).with_context(|| format!("read {}", file.display()))?;
        info!(path = %file.display(), row_count = entries.len(), "loaded list table");
        tables.push(entries);
    }
    let combined = combine_lists(tables);
    let output = output.unwrap_or_else(|| dir.join(COMBINED_FILE_NAME));
    write_list_csv(&output, &combined.entries)?;
    Ok(CombineResult {
        output,
        files,
        combined,
    })
}

pub fn analyze(input: &Path) -> Result<DuplicateAnalysis> {
    let entries =
        read_list_table(input).with_context(|| format!("read {}", input.display()))?;
    Ok(analyze_duplicates(&entries))
}

pub fn dedupe(input: &Path, output: &Path) -> Result<DedupReport> {
    let entries =
        read_list_table(input).with_context(|| format!("read {}", input.display()))?;
    let outcome = deduplicate(entries);
    write_list_csv(output, &outcome.entries)?;
    Ok(outcome.report)
}

pub fn revision(text_path: &Path) -> Result<Option<String>> {
    let text = fs::read_to_string(text_path)
        .with_context(|| format!("read change record {}", text_path.display()))?;
    Ok(extract_revision(&text))
}

/// Built-in catalog, or the rule table when one is given.
pub fn load_catalog(rules: Option<&Path>) -> Result<RuleCatalog> {
    match rules {
        Some(path) => {
            let catalog = load_rule_table(path)
                .with_context(|| format!("load rule table {}", path.display()))?;
            info!(path = %path.display(), rule_count = catalog.len(), "loaded rule table");
            Ok(catalog)
        }
        None => Ok(RuleCatalog::builtin()),
    }
}

/// Optional lookup: absent means unavailable, unreadable means fallback.
pub fn load_optional_section201(path: &Path) -> Option<Section201Table> {
    if !path.exists() {
        info!(path = %path.display(), "section 201 table not found; using rule classification");
        return None;
    }
    match load_section201_table(path) {
        Ok(table) => {
            info!(path = %path.display(), row_count = table.len(), "loaded section 201 table");
            Some(table)
        }
        Err(error) => {
            warn!(
                path = %path.display(),
                error = %error,
                "failed to load section 201 table; using rule classification"
            );
            None
        }
    }
}

pub struct PreprocessRequest {
    pub input: PathBuf,
    pub section301: PathBuf,
    pub output: PathBuf,
    pub settings: PreprocessSettings,
    pub generation_date: NaiveDate,
}

#[derive(Debug)]
pub struct PreprocessResult {
    pub output: PathBuf,
    pub hts_revision: String,
    pub stats: ScheduleStats,
    pub section301_codes: usize,
    pub section201_loaded: bool,
    pub rule_count: usize,
    pub duration_ms: u128,
}

pub fn preprocess(request: &PreprocessRequest) -> Result<PreprocessResult> {
    let settings = &request.settings;
    let span = info_span!("preprocess", input = %request.input.display());
    let _guard = span.enter();
    let start = Instant::now();

    let catalog = load_catalog(settings.rules.as_deref())?;
    let section301_entries = read_list_table(&request.section301)
        .with_context(|| format!("load section 301 table {}", request.section301.display()))?;
    let section301 = Section301Table::from_entries(section301_entries);
    info!(code_count = section301.len(), "loaded section 301 table");
    let section201 = load_optional_section201(&settings.section201);

    let mut inputs = vec![
        fingerprint("base_schedule", &request.input)?,
        fingerprint("section_301", &request.section301)?,
    ];
    if section201.is_some() {
        inputs.push(fingerprint("section_201", &settings.section201)?);
    }
    if let Some(rules) = &settings.rules {
        inputs.push(fingerprint("rules", rules)?);
    }

    let options = ResolverOptions {
        inject_extra_tariffs: settings.inject_extra_tariffs,
        as_of: settings.as_of,
    };
    let resolver = DutyResolver::new(ResolverContext {
        catalog: &catalog,
        section301: &section301,
        section201: section201.as_ref(),
        options,
    });
    let mut assembler = ScheduleAssembler::new(resolver, settings.section_301_only);
    let reader = BaseTableReader::open(&request.input)
        .with_context(|| format!("open base schedule {}", request.input.display()))?;
    for row in reader {
        let row = row.with_context(|| format!("read base schedule {}", request.input.display()))?;
        assembler.push_row(row);
    }
    let (entries, stats) = assembler.finish();
    if stats.degraded_values > 0 {
        warn!(
            degraded_values = stats.degraded_values,
            "unparsable rate values treated as zero"
        );
    }

    let run = RunDescription {
        generation_date: request.generation_date,
        hts_revision: settings.hts_revision.clone(),
        options,
        section_301_only: settings.section_301_only,
        inputs,
    };
    let document = ScheduleDocument::new(run, &catalog, entries, stats.clone());
    write_json_atomic(&request.output, &document)
        .with_context(|| format!("write schedule {}", request.output.display()))?;

    let duration_ms = start.elapsed().as_millis();
    info!(
        row_count = stats.total_rows,
        entry_count = stats.total_entries,
        duration_ms,
        "preprocess complete"
    );
    Ok(PreprocessResult {
        output: request.output.clone(),
        hts_revision: settings.hts_revision.clone(),
        stats,
        section301_codes: section301.len(),
        section201_loaded: section201.is_some(),
        rule_count: catalog.len(),
        duration_ms,
    })
}
