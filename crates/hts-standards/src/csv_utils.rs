//! Shared CSV utilities for loading reference tables.

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Result, StandardsError};

/// One data row keyed by trimmed header, with its line in the source file.
#[derive(Debug, Clone, Default)]
pub struct CsvRow {
    pub line: u64,
    values: BTreeMap<String, String>,
}

impl CsvRow {
    /// Field value, empty string if the column is absent.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    /// Field value, `None` if absent or empty.
    pub fn optional(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.values.values().all(String::is_empty)
    }
}

/// Read a CSV file into row maps.
///
/// Lines starting with `#` are skipped, header BOMs and whitespace are
/// trimmed and cell values are trimmed. Every column in `required` must be
/// present in the header.
pub fn read_csv_rows(path: &Path, required: &[&str]) -> Result<Vec<CsvRow>> {
    let file = std::fs::File::open(path).map_err(|e| StandardsError::io(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| StandardsError::csv(path, &e))?
        .iter()
        .map(|header| header.trim_matches('\u{feff}').trim().to_string())
        .collect();
    for column in required {
        if !headers.iter().any(|header| header == column) {
            return Err(StandardsError::MissingColumn {
                path: path.to_path_buf(),
                column: (*column).to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| StandardsError::csv(path, &e))?;
        let line = record.position().map_or(0, csv::Position::line);
        let mut values = BTreeMap::new();
        for (idx, value) in record.iter().enumerate() {
            let Some(key) = headers.get(idx) else {
                continue;
            };
            values.insert(key.clone(), value.trim().to_string());
        }
        let row = CsvRow { line, values };
        if !row.is_blank() {
            rows.push(row);
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_trims_bom() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("table.csv");
        std::fs::write(
            &path,
            "\u{feff}HTS_Code , Rate\n# comment line\n8541.42.00, 14.25 \n,\n",
        )
        .expect("write csv");

        let rows = read_csv_rows(&path, &["HTS_Code"]).expect("read rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("HTS_Code"), "8541.42.00");
        assert_eq!(rows[0].get("Rate"), "14.25");
        assert_eq!(rows[0].optional("Missing"), None);
    }

    #[test]
    fn reports_missing_columns() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("table.csv");
        std::fs::write(&path, "Code,Rate\n1,2\n").expect("write csv");
        let err = read_csv_rows(&path, &["HTS_Code"]).unwrap_err();
        assert!(matches!(err, StandardsError::MissingColumn { .. }));
    }
}
