//! Error types for rnaseq-dge

use thiserror::Error;

/// Main error type for differential expression operations
#[derive(Error, Debug)]
pub enum DgeError {
    #[error("Invalid grouping: {reason}")]
    InvalidGrouping { reason: String },

    #[error("Unsupported method '{method}': {reason}")]
    UnsupportedMethod { method: String, reason: String },

    #[error("Sample '{sample}' has no group label")]
    UnlabeledSample { sample: String },

    #[error("No gene length available for gene '{gene}'")]
    MissingGeneLength { gene: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("Duplicate {kind} identifier '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DgeError {
    pub(crate) fn invalid_grouping(reason: impl Into<String>) -> Self {
        DgeError::InvalidGrouping {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported_method(method: impl Into<String>, reason: impl Into<String>) -> Self {
        DgeError::UnsupportedMethod {
            method: method.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        DgeError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Result type alias for differential expression operations
pub type Result<T> = std::result::Result<T, DgeError>;
