//! Variable and parameter combiners.
//!
//! Both turn one section of a [`DataDict`] into a single [`Table`]:
//!
//! - [`DataDict::combine_vars`] stacks the per-object-type time series under
//!   an `obj_type` index level.
//! - [`DataDict::combine_pars`] expands fixed and varied parameters to one
//!   row per run, replicated `log["iterations"]` times and indexed by
//!   `run_id`.

use dt_table::{Table, TableError};

use crate::data_dict::{DataDict, Entry, Mapping, PARAMETERS, VARIABLES};
use crate::json::value_from_json;
use crate::{OutputError, OutputResult};

/// Index level added when per-type variable tables are stacked.
pub const OBJ_TYPE: &str = "obj_type";

/// Sequential run identifier of the combined parameter table.
pub const RUN_ID: &str = "run_id";

impl DataDict {
    /// Combine the `variables` section into one table.
    ///
    /// - a single table is returned unchanged (no filter applies);
    /// - a nested container with exactly one entry yields that entry as is;
    /// - otherwise entries holding none of `var_keys` and entries whose type
    ///   is not in `obj_types` are dropped, the rest stacked under a new
    ///   outermost `obj_type` level, and the result projected to `var_keys`.
    ///
    /// Fails with a column lookup error if a requested variable is missing
    /// from every remaining type, and with [`OutputError::NoObjectTypes`] if
    /// the filters leave no type at all.
    pub fn combine_vars(&self, obj_types: Option<&[String]>, var_keys: Option<&[String]>) -> OutputResult<Table> {
        let section = self
            .variables()
            .ok_or_else(|| OutputError::KeyNotFound(VARIABLES.to_owned()))?;

        let by_type = match section {
            Entry::Table(t) => return Ok(t.clone()),
            Entry::Dict(d) => d,
            _ => {
                return Err(OutputError::SectionType {
                    key:      VARIABLES.to_owned(),
                    expected: "a table or a DataDict of tables",
                })
            }
        };

        let tables = by_type
            .iter()
            .map(|(obj_type, entry)| {
                entry.as_table().map(|t| (obj_type, t)).ok_or_else(|| OutputError::SectionType {
                    key:      format!("{VARIABLES}.{obj_type}"),
                    expected: "a table",
                })
            })
            .collect::<OutputResult<Vec<_>>>()?;

        if let [(_, only)] = tables.as_slice() {
            return Ok((*only).clone());
        }

        let selected: Vec<(&str, &Table)> = tables
            .iter()
            .copied()
            .filter(|(_, t)| var_keys.is_none_or(|keys| keys.iter().any(|k| t.contains_column(k))))
            .filter(|(obj_type, _)| obj_types.is_none_or(|types| types.iter().any(|x| x.as_str() == *obj_type)))
            .collect();

        if selected.is_empty() {
            let unknown = var_keys
                .into_iter()
                .flatten()
                .find(|k| !tables.iter().any(|(_, t)| t.contains_column(k)));
            return Err(match unknown {
                Some(key) => TableError::ColumnNotFound(key.clone()).into(),
                None => OutputError::NoObjectTypes { obj_types: obj_types.unwrap_or_default().to_vec() },
            });
        }

        let combined = Table::concat_keyed(&selected, OBJ_TYPE);
        match var_keys {
            Some(keys) => Ok(combined.select(keys)?),
            None => Ok(combined),
        }
    }

    /// Combine the `parameters` section into one row per run.
    ///
    /// Accepted shapes:
    ///
    /// | Shape                                   | Base table                          |
    /// |-----------------------------------------|-------------------------------------|
    /// | `DataDict { fixed, varied }`            | `varied` + each `fixed` key broadcast |
    /// | `DataDict { fixed }`                    | one row from `fixed`                |
    /// | `Mapping`                               | one row                             |
    /// | `Table`                                 | as is                               |
    ///
    /// The base table is then stacked `iterations` times (copy by copy) and
    /// given a fresh `run_id` index starting at 0.
    pub fn combine_pars(&self) -> OutputResult<Table> {
        let section = self
            .parameters()
            .ok_or_else(|| OutputError::KeyNotFound(PARAMETERS.to_owned()))?;

        let base = match section {
            Entry::Dict(d) => fixed_and_varied(d)?,
            Entry::Mapping(m) => mapping_row(m)?,
            Entry::Table(t) => t.clone(),
            Entry::Scalar(_) => return Err(OutputError::ParametersType),
        };

        Ok(base.repeat(self.iterations()?).with_range_index(RUN_ID))
    }

    /// Replication factor from `log["iterations"]`; 1 when not recorded.
    pub fn iterations(&self) -> OutputResult<usize> {
        match self.log().and_then(|log| log.get("iterations")) {
            None => Ok(1),
            Some(n) => n
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| OutputError::InvalidLog {
                    field:  "iterations",
                    reason: format!("expected a non-negative integer, got {n}"),
                }),
        }
    }
}

fn fixed_and_varied(params: &DataDict) -> OutputResult<Table> {
    let fixed = match params.get("fixed") {
        None => None,
        Some(Entry::Mapping(m)) => Some(m),
        Some(_) => {
            return Err(OutputError::SectionType {
                key:      format!("{PARAMETERS}.fixed"),
                expected: "a mapping",
            })
        }
    };

    let mut table = match params.get("varied") {
        Some(Entry::Table(t)) => t.clone(),
        Some(_) => {
            return Err(OutputError::SectionType {
                key:      format!("{PARAMETERS}.varied"),
                expected: "a table",
            })
        }
        None => return fixed.map_or(Err(OutputError::ParametersType), mapping_row),
    };

    for (name, value) in fixed.into_iter().flatten() {
        table.insert_broadcast(name.as_str(), value_from_json(value));
    }
    Ok(table)
}

fn mapping_row(mapping: &Mapping) -> OutputResult<Table> {
    Ok(Table::from_columns(
        mapping.iter().map(|(k, v)| (k.as_str(), vec![value_from_json(v)])),
    )?)
}
