use std::fs;

use hts_report::{fingerprint, temp_path_for, write_json_atomic};

#[test]
fn document_with_fingerprints_round_trips_through_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("section301_deduplicated.csv");
    fs::write(&input, "HTS_Code,Description,List\n8471.30.01,Laptops,4a\n").expect("seed");

    let inputs = vec![fingerprint("section_301", &input).expect("fingerprint")];
    let output = dir.path().join("tariff_schedule.json");
    write_json_atomic(&output, &serde_json::json!({ "metadata": { "inputs": inputs } }))
        .expect("write");

    let text = fs::read_to_string(&output).expect("read");
    let value: serde_json::Value = serde_json::from_str(&text).expect("parse");
    let recorded = &value["metadata"]["inputs"][0];
    assert_eq!(recorded["role"], "section_301");
    assert_eq!(recorded["sha256"].as_str().map(str::len), Some(64));
    assert!(!temp_path_for(&output).exists());
}

#[test]
fn fingerprint_changes_with_content() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("rules.csv");
    fs::write(&path, "RuleName\n").expect("seed");
    let before = fingerprint("rules", &path).expect("fingerprint");
    fs::write(&path, "RuleName\nsection_232_steel\n").expect("rewrite");
    let after = fingerprint("rules", &path).expect("fingerprint");
    assert_ne!(before.sha256, after.sha256);
}
