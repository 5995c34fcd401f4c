//! Input fingerprints.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use hts_core::InputFingerprint;
use sha2::{Digest, Sha256};

use crate::error::{ReportError, Result};

/// SHA-256 of a file, hex encoded.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| ReportError::io("read", path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| ReportError::io("read", path, e))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn fingerprint(role: &str, path: &Path) -> Result<InputFingerprint> {
    Ok(InputFingerprint {
        role: role.to_string(),
        path: path.display().to_string(),
        sha256: sha256_file(path)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn hashes_file_contents() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"Hello, World!").expect("write");
        file.flush().expect("flush");

        let fingerprint = fingerprint("section_301", file.path()).expect("fingerprint");
        assert_eq!(fingerprint.role, "section_301");
        assert_eq!(
            fingerprint.sha256,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(sha256_file(&dir.path().join("absent.csv")).is_err());
    }
}
