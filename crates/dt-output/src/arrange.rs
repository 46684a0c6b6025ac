//! Arrangement engine: flattens a [`DataDict`] into one analysis table.
//!
//! # Pipeline
//!
//! ```text
//! ① variables   combine_vars(obj_types, var_keys)            → working table
//! ② measures    project to measure_keys;
//!               no working table  → measures become it
//!               otherwise         → sparse row stack, measures on top,
//!                                   variables' index restored
//! ③ parameters  combine_pars, project to param_keys;
//!               no working table  → parameters become it
//!               multi-level index → broadcast onto it via `run_id`
//!               then column-wise join
//! ④ scenarios   keep rows whose `scenario` is listed
//! ⑤ index       flatten index levels into columns unless asked to keep them
//! ```
//!
//! Sections are always processed in this order, whatever the order of
//! `data_keys`.  Rows are never deduplicated.

use dt_table::{Table, Value};

use crate::combine::RUN_ID;
use crate::data_dict::{DataDict, MEASURES, PARAMETERS, VARIABLES};
use crate::{OutputError, OutputResult};

/// Sections `arrange` knows how to combine.
pub const SUPPORTED_KEYS: &[&str] = &[VARIABLES, MEASURES, PARAMETERS];

/// Index level or column used by the scenario filter.
pub const SCENARIO: &str = "scenario";

/// Selection and shape options for [`DataDict::arrange`].
///
/// Every list left unset (or set empty) selects everything.
///
/// ```rust,ignore
/// let table = data.arrange(
///     &ArrangeOptions::new()
///         .data_keys(["variables", "parameters"])
///         .obj_types(["Agent"])
///         .param_keys(["beta"]),
/// )?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct ArrangeOptions {
    pub data_keys:    Option<Vec<String>>,
    pub var_keys:     Option<Vec<String>>,
    pub obj_types:    Option<Vec<String>>,
    pub measure_keys: Option<Vec<String>>,
    pub param_keys:   Option<Vec<String>>,
    pub scenarios:    Option<Vec<Value>>,
    /// Keep the (multi-level) index instead of flattening it into columns.
    pub index:        bool,
}

fn strings<I, S>(items: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(items.into_iter().map(Into::into).collect())
}

impl ArrangeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_keys<I: IntoIterator<Item = S>, S: Into<String>>(mut self, keys: I) -> Self {
        self.data_keys = strings(keys);
        self
    }

    pub fn var_keys<I: IntoIterator<Item = S>, S: Into<String>>(mut self, keys: I) -> Self {
        self.var_keys = strings(keys);
        self
    }

    pub fn obj_types<I: IntoIterator<Item = S>, S: Into<String>>(mut self, types: I) -> Self {
        self.obj_types = strings(types);
        self
    }

    pub fn measure_keys<I: IntoIterator<Item = S>, S: Into<String>>(mut self, keys: I) -> Self {
        self.measure_keys = strings(keys);
        self
    }

    pub fn param_keys<I: IntoIterator<Item = S>, S: Into<String>>(mut self, keys: I) -> Self {
        self.param_keys = strings(keys);
        self
    }

    pub fn scenarios<I: IntoIterator<Item = V>, V: Into<Value>>(mut self, scenarios: I) -> Self {
        self.scenarios = Some(scenarios.into_iter().map(Into::into).collect());
        self
    }

    pub fn keep_index(mut self, index: bool) -> Self {
        self.index = index;
        self
    }
}

/// An unset or empty selection means "everything".
fn selection<T>(list: &Option<Vec<T>>) -> Option<&[T]> {
    list.as_deref().filter(|l| !l.is_empty())
}

impl DataDict {
    /// Combine the requested sections into a single table.
    ///
    /// # Errors
    ///
    /// - [`OutputError::KeyNotFound`] if a requested section is absent;
    /// - [`OutputError::UnsupportedKey`] if it is not one of [`SUPPORTED_KEYS`];
    /// - [`OutputError::Table`] if a requested variable, measure, parameter,
    ///   the `run_id` level or the `scenario` column is missing.
    pub fn arrange(&self, options: &ArrangeOptions) -> OutputResult<Table> {
        let data_keys = self.resolve_data_keys(options.data_keys.as_deref())?;
        let wants = |key: &str| data_keys.iter().any(|k| *k == key);

        let mut working: Option<Table> = None;

        if wants(VARIABLES) {
            working = Some(self.combine_vars(selection(&options.obj_types), selection(&options.var_keys))?);
        }

        if wants(MEASURES) {
            let measures = self.measures().ok_or_else(|| OutputError::SectionType {
                key:      MEASURES.to_owned(),
                expected: "a table",
            })?;
            let measures = match selection(&options.measure_keys) {
                Some(keys) => measures.select(keys)?,
                None => measures.clone(),
            };
            working = Some(match working {
                None => measures,
                Some(variables) => stack_measures(&measures, &variables)?,
            });
        }

        if wants(PARAMETERS) {
            let params = self.combine_pars()?;
            let params = match selection(&options.param_keys) {
                Some(keys) => params.select(keys)?,
                None => params,
            };
            working = Some(match working {
                None => params,
                Some(table) => {
                    let params = if table.is_multi_index() {
                        params.reindex_on_level(&table, RUN_ID)?
                    } else {
                        params
                    };
                    table.join_columns(&params)?
                }
            });
        }

        let mut table = working.unwrap_or_default();

        if let Some(scenarios) = selection(&options.scenarios) {
            table = table.filter_in(SCENARIO, scenarios)?;
        }

        if !options.index {
            table = table.reset_index()?;
        }
        Ok(table)
    }

    fn resolve_data_keys<'a>(&'a self, requested: Option<&'a [String]>) -> OutputResult<Vec<&'a str>> {
        let Some(requested) = requested else {
            return Ok(self.keys().filter(|k| SUPPORTED_KEYS.contains(k)).collect());
        };
        for key in requested {
            if !self.contains_key(key) {
                return Err(OutputError::KeyNotFound(key.clone()));
            }
            if !SUPPORTED_KEYS.contains(&key.as_str()) {
                return Err(OutputError::UnsupportedKey {
                    key:       key.clone(),
                    supported: SUPPORTED_KEYS,
                });
            }
        }
        Ok(requested.iter().map(String::as_str).collect())
    }
}

/// Row-union of per-run measures and per-step variables.
///
/// Both indexes are flattened, measures are stacked above variables, and the
/// variables' index is rebuilt.  Cells one side has no column for are `Null`.
fn stack_measures(measures: &Table, variables: &Table) -> OutputResult<Table> {
    let index = variables.index_names();
    let stacked = Table::concat_rows(&[&measures.reset_index()?, &variables.reset_index()?]);
    if index.is_empty() {
        Ok(stacked)
    } else {
        Ok(stacked.set_index(&index)?)
    }
}
