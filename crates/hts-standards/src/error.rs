#![deny(unsafe_code)]

use std::path::PathBuf;

use hts_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("missing required column {column} in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("invalid rule at {path} line {line}: {message}")]
    InvalidRule {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("invalid rule at {path} line {line}: {source}")]
    InvalidRuleValue {
        path: PathBuf,
        line: u64,
        #[source]
        source: ModelError,
    },

    #[error("duplicate rule name {name} at {path} line {line}")]
    DuplicateRule {
        path: PathBuf,
        line: u64,
        name: String,
    },

    #[error("duplicate rule name in catalog: {name}")]
    DuplicateRuleName { name: String },

    #[error("invalid row at {path} line {line}: {message}")]
    InvalidRow {
        path: PathBuf,
        line: u64,
        message: String,
    },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: &csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            message: source.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
