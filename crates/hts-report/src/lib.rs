//! Output side of the schedule builder: the JSON document and CSV exports
//! are written all-or-nothing, and inputs are fingerprinted for the metadata.

pub mod error;
pub mod hash;
pub mod write;

pub use error::{ReportError, Result};
pub use hash::{fingerprint, sha256_file};
pub use write::{temp_path_for, write_atomic, write_json_atomic};
