//! FILENAME: core/pivot-engine/src/error.rs

use thiserror::Error;

pub type PivotResult<T> = Result<T, PivotError>;

#[derive(Error, Debug)]
pub enum PivotError {
    #[error("Invalid pivot configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("Page size must be greater than zero")]
    InvalidPageSize,

    #[error("Unknown aggregation: {0}")]
    UnknownAggregation(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field is not a value field: {0}")]
    NotAValueField(String),
}
