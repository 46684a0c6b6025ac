//! Persistence layer: one directory per saved experiment.
//!
//! # Directory layout
//!
//! ```text
//! {path}/{exp_name}_{exp_id}/
//!     log.json                 top-level mapping
//!     measures.csv             top-level table
//!     parameters_fixed.json    nested mapping   → parameters["fixed"]
//!     parameters_varied.csv    nested table     → parameters["varied"]
//!     variables_Agent.csv      nested table     → variables["Agent"]
//! ```
//!
//! # Experiment ids
//!
//! When no id is given, every entry of `{path}` whose name *contains*
//! `exp_name` is considered a previous save of the same experiment and the
//! integer after its last `_` is taken as its id.  Names that share a prefix
//! (`flock` and `flock_large`) therefore share an id sequence.  Entries whose
//! last `_` segment is not an integer are ignored.
//!
//! # Partial loads
//!
//! Each file is decoded independently.  A file that cannot be read or
//! decoded is logged, recorded in [`LoadReport::failures`], and left out of
//! the container; the remaining files still load.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::csv::{read_table_file, write_table_file};
use crate::data_dict::{DataDict, Entry, PARAMETERS, VARIABLES};
use crate::json::{read_entry_file, write_mapping_file};
use crate::{OutputConfig, OutputError, OutputResult};

/// Column names promoted back to index levels when a CSV file is loaded,
/// in level order.
pub const INDEX_COLUMNS: &[&str] = &["sample_id", "run_id", "scenario", "env_key", "agent_id", "obj_id", "t"];

/// Sections split across `{section}_{key}` files.
const NESTED_SECTIONS: &[&str] = &[VARIABLES, PARAMETERS];

// ── File formats ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "csv" => Some(FileFormat::Csv),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }

    fn read(self, path: &Path) -> OutputResult<Entry> {
        match self {
            FileFormat::Csv => Ok(Entry::Table(read_table_file(path, INDEX_COLUMNS)?)),
            FileFormat::Json => read_entry_file(path),
        }
    }
}

// ── Load report ───────────────────────────────────────────────────────────────

/// A file that was skipped during [`load_report`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileFailure {
    pub file:   String,
    pub reason: String,
}

/// Everything [`load_report`] recovered, plus what it had to skip.
#[derive(Clone, Debug, Default)]
pub struct LoadReport {
    pub data:     DataDict,
    pub failures: Vec<FileFailure>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// ── Save ──────────────────────────────────────────────────────────────────────

impl DataDict {
    /// Write every section to `{config.path}/{exp_name}_{exp_id}/`.
    ///
    /// `exp_name` defaults to `log["name"]`; spaces become underscores.
    /// `exp_id` defaults to one more than the highest id already saved under
    /// that name.  Returns the created directory.
    ///
    /// Scalar entries and containers nested more than one level deep are not
    /// written.
    pub fn save(&self, exp_name: Option<&str>, exp_id: Option<u32>, config: &OutputConfig) -> OutputResult<PathBuf> {
        if !config.path.exists() {
            fs::create_dir(&config.path)?;
        }

        let exp_name = match exp_name {
            Some(name) => name.to_owned(),
            None => self
                .log()
                .and_then(|log| log.get("name"))
                .and_then(|name| name.as_str())
                .ok_or(OutputError::MissingName)?
                .to_owned(),
        }
        .replace(' ', "_");

        let exp_id = match exp_id {
            Some(id) => id,
            None => last_exp_id(&exp_name, &config.path)? + 1,
        };

        let dir = config.path.join(format!("{exp_name}_{exp_id}"));
        fs::create_dir(&dir)?;

        for (key, entry) in self.iter() {
            match entry {
                Entry::Table(table) => write_table_file(&dir.join(format!("{key}.csv")), table)?,
                Entry::Mapping(mapping) => write_mapping_file(&dir.join(format!("{key}.json")), mapping)?,
                Entry::Dict(inner) => {
                    for (inner_key, inner_entry) in inner.iter() {
                        let stem = format!("{key}_{inner_key}");
                        match inner_entry {
                            Entry::Table(table) => write_table_file(&dir.join(format!("{stem}.csv")), table)?,
                            Entry::Mapping(mapping) => {
                                write_mapping_file(&dir.join(format!("{stem}.json")), mapping)?
                            }
                            _ => debug!(entry = %stem, "not persisted: only tables and mappings are saved"),
                        }
                    }
                }
                Entry::Scalar(_) => debug!(entry = %key, "not persisted: scalar entry"),
            }
        }

        if config.display {
            info!("Data saved to {}", dir.display());
        }
        Ok(dir)
    }
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Read `{config.path}/{exp_name}_{exp_id}/` back into a [`DataDict`].
///
/// Per-file failures are logged and skipped; see [`load_report`] to inspect
/// them.
pub fn load(exp_name: &str, exp_id: Option<u32>, config: &OutputConfig) -> OutputResult<DataDict> {
    load_report(exp_name, exp_id, config).map(|report| report.data)
}

/// Like [`load`] but also returns the files that could not be loaded.
///
/// `exp_id` of `None` or `Some(0)` selects the highest saved id.  Fails with
/// [`OutputError::ExperimentNotFound`] when no matching directory exists.
pub fn load_report(exp_name: &str, exp_id: Option<u32>, config: &OutputConfig) -> OutputResult<LoadReport> {
    let exp_name = exp_name.replace(' ', "_");
    let not_found = || OutputError::ExperimentNotFound {
        name: exp_name.clone(),
        path: config.path.display().to_string(),
    };

    if !config.path.is_dir() {
        return Err(not_found());
    }
    let exp_id = match exp_id.filter(|&id| id != 0) {
        Some(id) => id,
        None => match last_exp_id(&exp_name, &config.path)? {
            0 => return Err(not_found()),
            id => id,
        },
    };

    let dir = config.path.join(format!("{exp_name}_{exp_id}"));
    if !dir.is_dir() {
        return Err(not_found());
    }
    if config.display {
        info!("Loading from directory {}", dir.display());
    }

    let mut report = LoadReport::default();
    let entries = fs::read_dir(&dir)?.map(|entry| entry.map(|e| e.path()));
    let files = list_files(entries, &dir, &mut report.failures);

    for path in &files {
        let file = path.file_name().map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        match load_file(&mut report.data, path, &file) {
            Ok(()) => {
                if config.display {
                    info!("Loading {file} - Successful");
                }
            }
            Err(e) => {
                warn!("Loading {file} - Error: {e}");
                report.failures.push(FileFailure { file, reason: e.to_string() });
            }
        }
    }
    Ok(report)
}

/// Regular files among `entries`, sorted.  Entries that cannot be read are
/// logged and recorded against `dir`.
pub(crate) fn list_files<I>(entries: I, dir: &Path, failures: &mut Vec<FileFailure>) -> Vec<PathBuf>
where
    I: IntoIterator<Item = io::Result<PathBuf>>,
{
    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                warn!("Listing {} - Error: {e}", dir.display());
                failures.push(FileFailure { file: dir.display().to_string(), reason: e.to_string() });
            }
        }
    }
    files.sort();
    files
}

/// Decode one file and place it under its key.
fn load_file(data: &mut DataDict, path: &Path, file: &str) -> OutputResult<()> {
    let (stem, ext) = file.rsplit_once('.').unwrap_or((file, ""));
    let format = FileFormat::from_extension(ext).ok_or_else(|| OutputError::UnsupportedFormat(ext.to_owned()))?;
    let entry = format.read(path)?;

    for section in NESTED_SECTIONS {
        if let Some(key) = stem.strip_prefix(section).and_then(|rest| rest.strip_prefix('_')) {
            data.dict_entry(section)?.insert(key, entry);
            return Ok(());
        }
    }
    data.insert(stem, entry);
    Ok(())
}

/// Highest id among entries of `path` whose name contains `exp_name`; 0 if
/// there are none.
pub fn last_exp_id(exp_name: &str, path: &Path) -> OutputResult<u32> {
    let mut last = 0;
    for entry in fs::read_dir(path)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if !name.contains(exp_name) {
            continue;
        }
        if let Some(id) = name.rsplit('_').next().and_then(|s| s.parse::<u32>().ok()) {
            last = last.max(id);
        }
    }
    Ok(last)
}
