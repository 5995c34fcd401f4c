use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown duty type: {0}")]
    UnknownDutyKind(String),
    #[error("unknown product type: {0}")]
    UnknownProductType(String),
    #[error("unknown applicability data type: {0}")]
    UnknownDataType(String),
    #[error("unknown rule status: {0}")]
    UnknownStatus(String),
    #[error("applicability {data_type} requires at least one value")]
    EmptyApplicability { data_type: String },
    #[error("invalid chapter: {0}")]
    InvalidChapter(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
