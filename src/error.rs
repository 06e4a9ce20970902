//! Record-level failures.
//!
//! None of these are fatal: map functions drop the offending line and move
//! on. Failures of the run itself (I/O, unknown workloads, bad arguments)
//! are plain [`anyhow::Error`]s.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("malformed date `{0}`")]
    MalformedDate(String),

    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("invalid {field} `{value}`")]
    InvalidField { field: &'static str, value: String },

    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("header line")]
    HeaderLine,
}

impl RecordError {
    pub(crate) fn invalid(field: &'static str, value: &str) -> Self {
        Self::InvalidField {
            field,
            value: value.to_string(),
        }
    }
}
