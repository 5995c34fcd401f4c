use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use hts_cli::config::{PreprocessFlags, PreprocessSettings, RunConfig};
use hts_cli::pipeline::{
    COMBINED_FILE_NAME, PreprocessRequest, combine, dedupe, extract_list, preprocess, revision,
};
use serde_json::Value;

const LIST3_TEXT: &str = "Annex C\n2845.90.00 Heavy water\n(deuterium oxide)\n\
                          8471.30.01 Portable machines\n";
const LIST4A_TEXT: &str = "Annex\n8471.30.01   Portable machines\n8471.30.01 Portable machines\n";

const BASE_SCHEDULE: &str = "hts8,brief_description,mfn_ad_val_rate,col2_ad_val_rate\n\
                             84713001,Portable machines,0,\n\
                             72081000,Flat-rolled iron,0,\n\
                             ,Stray footnote row,,\n";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write file");
    path
}

/// Extract, combine and dedupe two lists; returns the deduplicated table.
fn build_lists(dir: &Path) -> PathBuf {
    let list3 = write(dir, "list3.txt", LIST3_TEXT);
    let list4a = write(dir, "list4a.txt", LIST4A_TEXT);
    let count3 = extract_list(&list3, &dir.join("list3_hts_extracted.csv"), "3")
        .expect("extract list 3");
    let count4a = extract_list(&list4a, &dir.join("list4a_hts_extracted.csv"), "4A")
        .expect("extract list 4a");
    assert_eq!((count3, count4a), (2, 1));

    let combined = combine(dir, None).expect("combine");
    assert_eq!(combined.output, dir.join(COMBINED_FILE_NAME));
    assert_eq!(combined.files.len(), 2);
    assert_eq!(combined.combined.entries.len(), 3);
    assert_eq!(combined.combined.duplicate_codes.len(), 1);

    let deduped = dir.join("section301_deduped.csv");
    let report = dedupe(&combined.output, &deduped).expect("dedupe");
    assert_eq!(report.unique_codes, 2);
    assert_eq!(report.moved_to_reduced_tier.len(), 1);
    deduped
}

fn settings(section301: &Path) -> PreprocessSettings {
    let flags = PreprocessFlags {
        hts_revision: Some("2025 Revision 17".to_string()),
        inject_extra_tariffs: true,
        ..PreprocessFlags::default()
    };
    PreprocessSettings::resolve(flags, RunConfig::default(), section301).expect("settings")
}

fn request(dir: &Path, section301: PathBuf, output: &str) -> PreprocessRequest {
    PreprocessRequest {
        input: write(dir, "tariff_database_2025.csv", BASE_SCHEDULE),
        settings: settings(&section301),
        section301,
        output: dir.join(output),
        generation_date: NaiveDate::from_ymd_opt(2025, 7, 1).expect("date"),
    }
}

fn entry<'a>(document: &'a Value, hts8: &str) -> &'a Value {
    document["entries"]
        .as_array()
        .expect("entries")
        .iter()
        .find(|entry| entry["hts8"] == hts8)
        .expect("entry present")
}

#[test]
fn deduplicated_table_keeps_latest_list() {
    let dir = tempfile::tempdir().expect("temp dir");
    let deduped = build_lists(dir.path());
    let contents = fs::read_to_string(deduped).expect("read deduped table");
    insta::assert_snapshot!(contents, @r"
    HTS_Code,Description,List
    2845.90.00,Heavy water (deuterium oxide),3
    8471.30.01,Portable machines,4a
    ");
}

#[test]
fn preprocess_writes_schedule_document() {
    let dir = tempfile::tempdir().expect("temp dir");
    let section301 = build_lists(dir.path());
    let request = request(dir.path(), section301, "schedule.json");

    let result = preprocess(&request).expect("preprocess");
    assert_eq!(result.hts_revision, "2025 Revision 17");
    assert_eq!(result.section301_codes, 2);
    assert!(!result.section201_loaded);
    assert_eq!(result.stats.total_rows, 3);
    assert_eq!(result.stats.total_entries, 2);
    assert_eq!(result.stats.skipped_rows, 1);

    let text = fs::read_to_string(&request.output).expect("read document");
    let document: Value = serde_json::from_str(&text).expect("parse document");
    assert_eq!(document["generation_date"], "2025-07-01");
    assert_eq!(document["hts_revision"], "2025 Revision 17");
    assert_eq!(document["metadata"]["total_entries"], 2);
    assert_eq!(document["metadata"]["inject_extra_tariffs"], true);

    let roles: Vec<&str> = document["metadata"]["inputs"]
        .as_array()
        .expect("inputs")
        .iter()
        .filter_map(|input| input["role"].as_str())
        .collect();
    assert_eq!(roles, vec!["base_schedule", "section_301"]);

    let laptops = entry(&document, "84713001");
    assert_eq!(laptops["section_301_list"], "4a");
    let section_301: Vec<&Value> = laptops["duties"]
        .as_array()
        .expect("duties")
        .iter()
        .filter(|duty| duty["type"] == "section_301")
        .collect();
    assert_eq!(section_301.len(), 1);
    assert_eq!(section_301[0]["rate"], 7.5);

    let steel = entry(&document, "72081000");
    let kinds: Vec<&str> = steel["duties"]
        .as_array()
        .expect("duties")
        .iter()
        .filter_map(|duty| duty["type"].as_str())
        .collect();
    assert_eq!(kinds, vec!["section_232"]);
}

#[test]
fn malformed_section201_table_falls_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let section301 = build_lists(dir.path());
    write(
        dir.path(),
        "section201_solar.csv",
        "HTS_Code,Current_Rate\n8541.42.00,not-a-rate\n",
    );
    let request = request(dir.path(), section301, "schedule.json");

    let result = preprocess(&request).expect("preprocess");
    assert!(!result.section201_loaded);
    assert!(request.output.exists());
}

#[test]
fn missing_section301_table_leaves_no_output() {
    let dir = tempfile::tempdir().expect("temp dir");
    let request = request(dir.path(), dir.path().join("absent.csv"), "schedule.json");

    let error = preprocess(&request).expect_err("missing table");
    assert!(format!("{error:#}").contains("load section 301 table"));
    assert!(!request.output.exists());
    assert!(!dir.path().join(".schedule.json.tmp").exists());
}

#[test]
fn combine_requires_list_tables() {
    let dir = tempfile::tempdir().expect("temp dir");
    write(dir.path(), "notes.csv", "HTS_Code,Description,List\n");
    assert!(combine(dir.path(), None).is_err());
    assert!(!dir.path().join(COMBINED_FILE_NAME).exists());
}

#[test]
fn reads_revision_from_change_record() {
    let dir = tempfile::tempdir().expect("temp dir");
    let record = write(
        dir.path(),
        "change_record.txt",
        "Harmonized Tariff Schedule\nChange Record - HTS 2025 Revision 11\n",
    );
    assert_eq!(
        revision(&record).expect("read record").as_deref(),
        Some("Revision 11")
    );
    let empty = write(dir.path(), "empty.txt", "no label here\n");
    assert_eq!(revision(&empty).expect("read record"), None);
}
