//! All-or-nothing file replacement.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ReportError, Result};

/// Sibling temporary path (`.schedule.json.tmp` for `schedule.json`).
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write through a sibling temporary file, renamed over `path` only after a
/// successful flush. The temporary file is removed on every error path.
pub fn write_atomic<F, E>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::result::Result<(), E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| ReportError::io("create directory", parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let result = write_temp(path, &temp_path, write).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| ReportError::AtomicWriteFailed {
            temp_path: temp_path.clone(),
            target_path: path.to_path_buf(),
            source: e,
        })
    });
    if result.is_err() && temp_path.exists() {
        debug!(path = %temp_path.display(), "removing temporary file");
        let _ = fs::remove_file(&temp_path);
    }
    result?;
    info!(path = %path.display(), "wrote output");
    Ok(())
}

fn write_temp<F, E>(path: &Path, temp_path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::result::Result<(), E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let file = File::create(temp_path).map_err(|e| ReportError::io("create", temp_path, e))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).map_err(|e| ReportError::Content {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    let file = writer
        .into_inner()
        .map_err(|e| ReportError::io("flush", temp_path, e.into_error()))?;
    file.sync_all()
        .map_err(|e| ReportError::io("sync", temp_path, e))?;
    Ok(())
}

/// Pretty-printed JSON with a trailing newline.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_atomic(
        path,
        |writer| -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
            serde_json::to_writer_pretty(&mut *writer, value)?;
            writer.write_all(b"\n")?;
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_a_hidden_sibling() {
        assert_eq!(
            temp_path_for(Path::new("out/schedule.json")),
            PathBuf::from("out/.schedule.json.tmp")
        );
    }

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("schedule.json");
        fs::write(&path, "old").expect("seed");

        write_json_atomic(&path, &serde_json::json!({"entries": []})).expect("write");
        let written = fs::read_to_string(&path).expect("read");
        assert_eq!(written, "{\n  \"entries\": []\n}\n");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn failed_write_leaves_target_untouched() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("combined.csv");
        fs::write(&path, "previous").expect("seed");

        let err = write_atomic(&path, |writer| -> std::io::Result<()> {
            writer.write_all(b"partial")?;
            Err(std::io::Error::other("boom"))
        })
        .unwrap_err();
        assert!(matches!(err, ReportError::Content { .. }));
        assert_eq!(fs::read_to_string(&path).expect("read"), "previous");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("exports").join("list4a.csv");
        write_atomic(&path, |writer| writer.write_all(b"HTS_Code\n")).expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "HTS_Code\n");
    }
}
