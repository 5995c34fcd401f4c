//! Section 301 list tables: `HTS_Code, Description, List`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use hts_model::{ListEntry, Section301List};

use crate::error::{IngestError, Result};
use crate::header::{clean_cell, trim_header};

pub const LIST_TABLE_HEADERS: [&str; 3] = ["HTS_Code", "Description", "List"];

/// Read a list table in file order. Rows without a code are skipped.
pub fn read_list_table(path: &Path) -> Result<Vec<ListEntry>> {
    let file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::csv(path, &e))?
        .iter()
        .map(|header| trim_header(header).to_string())
        .collect();
    let position = |column: &str| headers.iter().position(|header| header == column);
    let required = |column: &str| {
        position(column).ok_or_else(|| IngestError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })
    };
    let code_idx = required("HTS_Code")?;
    let list_idx = required("List")?;
    let description_idx = position("Description");

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::csv(path, &e))?;
        let Some(code) = record.get(code_idx).and_then(clean_cell) else {
            continue;
        };
        let list = record.get(list_idx).and_then(clean_cell).unwrap_or_default();
        let description = description_idx
            .and_then(|idx| record.get(idx))
            .and_then(clean_cell)
            .unwrap_or_default();
        entries.push(ListEntry::new(
            &code,
            &description,
            Section301List::parse(&list),
        ));
    }
    Ok(entries)
}

/// Write entries in the given order with the list-table header.
pub fn write_list_table<W: Write>(writer: W, entries: &[ListEntry]) -> Result<()> {
    let mut csv = WriterBuilder::new().from_writer(writer);
    let write_error = |e: csv::Error| IngestError::CsvWrite {
        message: e.to_string(),
    };
    csv.write_record(LIST_TABLE_HEADERS).map_err(write_error)?;
    for entry in entries {
        csv.write_record([
            entry.raw_code.as_str(),
            entry.description.as_str(),
            entry.list.label(),
        ])
        .map_err(write_error)?;
    }
    csv.flush().map_err(|e| IngestError::CsvWrite {
        message: e.to_string(),
    })?;
    Ok(())
}
