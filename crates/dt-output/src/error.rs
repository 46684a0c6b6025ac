//! Error types for dt-output.

use dt_table::TableError;
use thiserror::Error;

/// Errors raised while arranging, saving, or loading recorded data.
///
/// Schema problems (`KeyNotFound`, `UnsupportedKey`, `Table`) and shape
/// problems (`ParametersType`, `SectionType`) surface from `arrange`
/// immediately.  During `load`, per-file `Io`/`Csv`/`Json`/`UnsupportedFormat`
/// failures are collected instead of returned.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("DataDict has no key '{0}'")]
    KeyNotFound(String),

    #[error("arrange doesn't support '{key}'; supported keys are: {supported:?}")]
    UnsupportedKey {
        key:       String,
        supported: &'static [&'static str],
    },

    #[error("parameters must be a mapping, a nested DataDict, or a table")]
    ParametersType,

    #[error("no object type in 'variables' matches obj_types {obj_types:?}")]
    NoObjectTypes { obj_types: Vec<String> },

    #[error("'{key}' must be {expected}")]
    SectionType {
        key:      String,
        expected: &'static str,
    },

    #[error("invalid log entry '{field}': {reason}")]
    InvalidLog {
        field:  &'static str,
        reason: String,
    },

    #[error("no experiment name given and log has no 'name'")]
    MissingName,

    #[error("no experiment found with name '{name}' in path '{path}'")]
    ExperimentNotFound {
        name: String,
        path: String,
    },

    #[error("file type '{0}' not supported")]
    UnsupportedFormat(String),

    #[error("table error: {0}")]
    Table(#[from] TableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
