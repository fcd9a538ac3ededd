//! Core error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid drift detection interval '{value}': {message}")]
    InvalidInterval { value: String, message: String },

    #[error("Drift detection interval must not be negative: {value}")]
    NegativeInterval { value: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
