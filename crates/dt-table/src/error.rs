//! Error type for table reshaping.

use thiserror::Error;

/// Errors raised by [`Table`](crate::Table) operations.
///
/// Every variant names the offending column or level so callers can surface
/// it unchanged.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("index level '{0}' not found")]
    LevelNotFound(String),

    #[error("column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("column '{column}' has {got} rows, expected {expected}")]
    LengthMismatch {
        column:   String,
        expected: usize,
        got:      usize,
    },

    /// Level names of both sides; empty for a positional index.
    #[error("cannot align index {left:?} with index {right:?}")]
    IndexMismatch {
        left:  Vec<String>,
        right: Vec<String>,
    },
}

/// Shorthand result type for `dt-table`.
pub type TableResult<T> = Result<T, TableError>;
