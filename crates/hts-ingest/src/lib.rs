pub mod base_table;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod header;
pub mod list_table;
pub mod revision;

pub use base_table::{BaseTableReader, CODE_COLUMNS};
pub use discovery::list_extracted_files;
pub use error::{IngestError, Result};
pub use extract::extract_list_entries;
pub use header::{clean_cell, normalize_header};
pub use list_table::{LIST_TABLE_HEADERS, read_list_table, write_list_table};
pub use revision::extract_revision;
