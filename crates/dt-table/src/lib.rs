//! `dt-table`: cell values and multi-indexed tables for the rust_dt output
//! layer.
//!
//! Recorded simulation output (per-object time series, per-run parameters,
//! per-run measures) is held in [`Table`]s.  This crate supplies only the
//! reshaping primitives that `dt-output` combines them with; it is not a
//! general dataframe library.
//!
//! # What lives here
//!
//! | Module      | Contents                                                 |
//! |-------------|----------------------------------------------------------|
//! | [`value`]   | `Value` cell type and numeric coercions                  |
//! | [`table`]   | `Column`, `Table` (concat, reindex, join, filter)        |
//! | [`error`]   | `TableError`, `TableResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to `Value`, `Column`, `Table`. |

pub mod error;
pub mod table;
pub mod value;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{TableError, TableResult};
pub use table::{Column, Table, POSITIONAL_LEVEL};
pub use value::Value;
