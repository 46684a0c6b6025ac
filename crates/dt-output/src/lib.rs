//! `dt-output`: container, arrangement and persistence for the recorded
//! output of rust_dt simulations.
//!
//! A run or experiment hands its recorded output over as a [`DataDict`]:
//! a log, the parameters it ran with, per-object-type time series
//! (`variables`) and per-run `measures`.  This crate
//!
//! - combines those sections into one flat or multi-indexed [`Table`]
//!   ([`DataDict::arrange`]);
//! - writes them to a versioned directory of CSV and JSON files
//!   ([`DataDict::save`]) and reads them back ([`load`]).
//!
//! | Module        | Contents                                               |
//! |---------------|--------------------------------------------------------|
//! | [`data_dict`] | `DataDict`, `Entry`, `Mapping`, section key constants  |
//! | [`combine`]   | `combine_vars`, `combine_pars`                         |
//! | [`arrange`]   | `ArrangeOptions`, `DataDict::arrange`                  |
//! | [`persist`]   | `DataDict::save`, `load`, `load_report`                |
//! | [`csv`]       | Table ↔ CSV                                            |
//! | [`json`]      | Cell ↔ JSON, mapping files                             |
//! | [`config`]    | `OutputConfig`                                         |
//! | [`error`]     | `OutputError`, `OutputResult`                          |
//!
//! # Usage
//!
//! ```rust,ignore
//! use dt_output::{load, ArrangeOptions, OutputConfig};
//!
//! let config = OutputConfig::default();
//! let dir = data.save(None, None, &config)?;
//! let loaded = load("virus_spread", None, &config)?;
//! let table = loaded.arrange(&ArrangeOptions::new().obj_types(["Person"]))?;
//! ```
//!
//! [`Table`]: dt_table::Table

pub mod arrange;
pub mod combine;
pub mod config;
pub mod csv;
pub mod data_dict;
pub mod error;
pub mod json;
pub mod persist;


pub use arrange::{ArrangeOptions, SCENARIO, SUPPORTED_KEYS};
pub use combine::{OBJ_TYPE, RUN_ID};
pub use config::OutputConfig;
pub use data_dict::{DataDict, Entry, Mapping, LOG, MEASURES, PARAMETERS, VARIABLES};
pub use error::{OutputError, OutputResult};
pub use json::{mapping_from, IntoJson};
pub use persist::{load, load_report, FileFailure, LoadReport, INDEX_COLUMNS};

pub use dt_table::{Table, Value};
