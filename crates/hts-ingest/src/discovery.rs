//! Discovery of extracted list files.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Lists `list*_hts_extracted.csv` files in `dir`, sorted by file name.
pub fn list_extracted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_list_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("list") && name.ends_with("_hts_extracted.csv"));
        if is_list_file {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_only_extracted_lists() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in [
            "list4a_hts_extracted.csv",
            "list1_hts_extracted.csv",
            "section301_deduplicated.csv",
            "list2_notes.txt",
        ] {
            std::fs::write(dir.path().join(name), "HTS_Code,Description,List\n").expect("write");
        }
        let files = list_extracted_files(dir.path()).expect("list files");
        let names: Vec<_> = files
            .iter()
            .filter_map(|path| path.file_name()?.to_str())
            .collect();
        assert_eq!(names, vec!["list1_hts_extracted.csv", "list4a_hts_extracted.csv"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = list_extracted_files(Path::new("/nonexistent/hts/exports")).unwrap_err();
        assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
    }
}
