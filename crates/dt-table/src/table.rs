//! Column-oriented table with a named, possibly multi-level index.
//!
//! # Layout
//!
//! A [`Table`] holds two ordered lists of [`Column`]s of equal length:
//!
//! ```text
//! index levels          data columns
//! obj_type  obj_id  t | x     y
//! Agent     1       0 | 0.5   null
//! Agent     1       1 | 0.7   null
//! Env       0       0 | null  3
//! ```
//!
//! An empty level list stands for an implicit positional index (row number).
//! Index keys are compared level-by-level when tables are aligned, so two
//! tables line up only if their levels carry equal values.
//!
//! Only the reshaping operations the output layer needs live here: row and
//! column concatenation, projection, index set/reset, broadcast along a shared
//! level and membership filtering.  Every operation returns a new table.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{TableError, TableResult, Value};

/// Level name given to a positional index once it is aligned with a named
/// one.
pub const POSITIONAL_LEVEL: &str = "index";

// ── Column ────────────────────────────────────────────────────────────────────

/// A named vector of cells.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    pub name:   String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self { name: name.into(), values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Gather rows by position; `None` yields `Value::Null`.
    fn gather(&self, positions: &[Option<usize>]) -> Column {
        let values = positions
            .iter()
            .map(|p| p.map_or(Value::Null, |i| self.values[i].clone()))
            .collect();
        Column { name: self.name.clone(), values }
    }

    fn pick(&self, rows: &[usize]) -> Column {
        Column {
            name:   self.name.clone(),
            values: rows.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

// ── Table ─────────────────────────────────────────────────────────────────────

/// An ordered set of equal-length data columns plus index levels.
///
/// Invariant: every column and every index level has exactly `rows` values,
/// and data column names are unique.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    index:   Vec<Column>,
    columns: Vec<Column>,
    rows:    usize,
}

impl Table {
    /// An empty table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    ///
    /// All columns must have the same length.
    pub fn from_columns<I, S>(columns: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut table = Table::new();
        for (name, values) in columns {
            table.push_column(name, values)?;
        }
        Ok(table)
    }

    /// Append a data column.
    ///
    /// The first column pushed onto a shapeless table fixes the row count.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> TableResult<()> {
        let name = name.into();
        if self.contains_column(&name) {
            return Err(TableError::DuplicateColumn(name));
        }
        if self.columns.is_empty() && self.index.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(TableError::LengthMismatch {
                column:   name,
                expected: self.rows,
                got:      values.len(),
            });
        }
        self.columns.push(Column { name, values });
        Ok(())
    }

    /// Set column `name` to `value` in every row, replacing an existing
    /// column of the same name in place.
    pub fn insert_broadcast(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        let values = vec![value; self.rows];
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => column.values = values,
            None => self.columns.push(Column { name, values }),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Index levels, outermost first.  Empty for a positional index.
    pub fn index(&self) -> &[Column] {
        &self.index
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn index_names(&self) -> Vec<&str> {
        self.index.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.values.as_slice())
    }

    pub fn index_level(&self, name: &str) -> Option<&[Value]> {
        self.index.iter().find(|c| c.name == name).map(|c| c.values.as_slice())
    }

    /// `true` if the index has more than one level.
    #[inline]
    pub fn is_multi_index(&self) -> bool {
        self.index.len() > 1
    }

    /// Cell at `row` in data column or index level `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name)
            .or_else(|| self.index_level(name))
            .and_then(|values| values.get(row))
    }

    /// Index key of `row`: one value per level, or the row position for a
    /// positional index.
    pub fn index_key(&self, row: usize) -> Vec<Value> {
        if self.index.is_empty() {
            vec![Value::Int(row as i64)]
        } else {
            self.index.iter().map(|level| level.values[row].clone()).collect()
        }
    }

    // ── Index manipulation ────────────────────────────────────────────────

    /// Replace the index with the named columns (or existing levels).
    ///
    /// Named data columns move into the index; levels not named are dropped.
    pub fn set_index<S: AsRef<str>>(&self, names: &[S]) -> TableResult<Table> {
        let mut index = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let level = self
                .columns
                .iter()
                .chain(self.index.iter())
                .find(|c| c.name == name)
                .ok_or_else(|| TableError::ColumnNotFound(name.to_owned()))?;
            index.push(level.clone());
        }
        let columns = self
            .columns
            .iter()
            .filter(|c| !names.iter().any(|n| n.as_ref() == c.name))
            .cloned()
            .collect();
        Ok(Table { index, columns, rows: self.rows })
    }

    /// Move every index level to the front of the data columns.
    ///
    /// A positional index is simply dropped.
    pub fn reset_index(&self) -> TableResult<Table> {
        let mut columns = Vec::with_capacity(self.index.len() + self.columns.len());
        for level in &self.index {
            if self.contains_column(&level.name) {
                return Err(TableError::DuplicateColumn(level.name.clone()));
            }
            columns.push(level.clone());
        }
        columns.extend(self.columns.iter().cloned());
        Ok(Table { index: Vec::new(), columns, rows: self.rows })
    }

    /// Replace the index with a fresh sequential `0..n` level called `name`.
    pub fn with_range_index(&self, name: &str) -> Table {
        let values = (0..self.rows as i64).map(Value::Int).collect();
        Table {
            index:   vec![Column::new(name, values)],
            columns: self.columns.clone(),
            rows:    self.rows,
        }
    }

    // ── Projection and filtering ──────────────────────────────────────────

    /// Keep exactly the named data columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> TableResult<Table> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let column = self
                .columns
                .iter()
                .find(|c| c.name == name)
                .ok_or_else(|| TableError::ColumnNotFound(name.to_owned()))?;
            columns.push(column.clone());
        }
        Ok(Table { index: self.index.clone(), columns, rows: self.rows })
    }

    /// Keep rows whose column or index level `name` holds one of `values`.
    pub fn filter_in(&self, name: &str, values: &[Value]) -> TableResult<Table> {
        let column = self
            .column(name)
            .or_else(|| self.index_level(name))
            .ok_or_else(|| TableError::ColumnNotFound(name.to_owned()))?;
        let rows: Vec<usize> = column
            .iter()
            .enumerate()
            .filter(|(_, v)| values.contains(v))
            .map(|(i, _)| i)
            .collect();
        Ok(self.take_rows(&rows))
    }

    fn take_rows(&self, rows: &[usize]) -> Table {
        Table {
            index:   self.index.iter().map(|c| c.pick(rows)).collect(),
            columns: self.columns.iter().map(|c| c.pick(rows)).collect(),
            rows:    rows.len(),
        }
    }

    // ── Row-wise combination ──────────────────────────────────────────────

    /// Stack tables vertically.
    ///
    /// Columns are the union of all parts in order of first appearance;
    /// cells a part has no column for are `Null`.  Index levels survive when
    /// every part has the same number of levels; a level whose name differs
    /// between parts is renamed `level_{i}`.
    pub fn concat_rows(parts: &[&Table]) -> Table {
        let rows = parts.iter().map(|t| t.rows).sum();

        let mut names: Vec<&str> = Vec::new();
        for part in parts {
            for column in &part.columns {
                if !names.contains(&column.name.as_str()) {
                    names.push(&column.name);
                }
            }
        }

        let columns = names
            .iter()
            .map(|&name| {
                let mut values = Vec::with_capacity(rows);
                for part in parts {
                    match part.column(name) {
                        Some(v) => values.extend_from_slice(v),
                        None => values.extend(std::iter::repeat_n(Value::Null, part.rows)),
                    }
                }
                Column::new(name, values)
            })
            .collect();

        Table { index: concat_index(parts), columns, rows }
    }

    /// Stack tables vertically under a new outermost index level `level`
    /// whose value in each row is the key of the part it came from.
    pub fn concat_keyed(parts: &[(&str, &Table)], level: &str) -> Table {
        let tables: Vec<&Table> = parts.iter().map(|(_, t)| *t).collect();
        let mut stacked = Table::concat_rows(&tables);
        let keys = parts
            .iter()
            .flat_map(|(key, t)| std::iter::repeat_n(Value::from(*key), t.rows))
            .collect();
        stacked.index.insert(0, Column::new(level, keys));
        stacked
    }

    /// `n` copies of this table stacked vertically, copy by copy.
    pub fn repeat(&self, n: usize) -> Table {
        let tile = |c: &Column| Column {
            name:   c.name.clone(),
            values: c.values.iter().cloned().cycle().take(c.values.len() * n).collect(),
        };
        Table {
            index:   self.index.iter().map(tile).collect(),
            columns: self.columns.iter().map(tile).collect(),
            rows:    self.rows * n,
        }
    }

    // ── Column-wise combination ───────────────────────────────────────────

    /// Broadcast this table onto `target`'s index through the shared level
    /// `level`.
    ///
    /// Row `i` of the result carries the values of the first row of `self`
    /// whose `level` equals `target`'s `level` at row `i` (or `Null`s when
    /// there is none) and `target`'s full index.
    pub fn reindex_on_level(&self, target: &Table, level: &str) -> TableResult<Table> {
        let keys = self
            .index_level(level)
            .ok_or_else(|| TableError::LevelNotFound(level.to_owned()))?;
        let wanted = target
            .index_level(level)
            .ok_or_else(|| TableError::LevelNotFound(level.to_owned()))?;

        let mut lookup: FxHashMap<&Value, usize> = FxHashMap::default();
        for (row, key) in keys.iter().enumerate() {
            lookup.entry(key).or_insert(row);
        }
        let positions: Vec<Option<usize>> = wanted.iter().map(|k| lookup.get(k).copied()).collect();

        Ok(Table {
            index:   target.index.clone(),
            columns: self.columns.iter().map(|c| c.gather(&positions)).collect(),
            rows:    target.rows,
        })
    }

    /// Place `other`'s columns to the right of this table's, aligning rows on
    /// their index keys.
    ///
    /// Rows of `self` keep their order; rows of `other` with no counterpart
    /// are appended at the bottom.  Unmatched cells are `Null`.
    ///
    /// Named indexes must carry the same level names.  A positional index
    /// lines up with a single named level by value; the result's level is
    /// then called `index`.
    pub fn join_columns(&self, other: &Table) -> TableResult<Table> {
        if let Some(clash) = other.columns.iter().find(|c| self.contains_column(&c.name)) {
            return Err(TableError::DuplicateColumn(clash.name.clone()));
        }

        if self.rows == other.rows && self.index == other.index {
            let mut joined = self.clone();
            joined.columns.extend(other.columns.iter().cloned());
            return Ok(joined);
        }

        let (names, other_names) = (self.index_names(), other.index_names());
        let names: Vec<&str> = match (names.len(), other_names.len()) {
            (0, 0) => Vec::new(),
            (0, 1) | (1, 0) => vec![POSITIONAL_LEVEL],
            _ if names == other_names => names,
            _ => {
                return Err(TableError::IndexMismatch {
                    left:  names.iter().map(|n| n.to_string()).collect(),
                    right: other_names.iter().map(|n| n.to_string()).collect(),
                })
            }
        };

        let mut lookup: FxHashMap<Vec<Value>, usize> = FxHashMap::default();
        for row in 0..other.rows {
            lookup.entry(other.index_key(row)).or_insert(row);
        }

        let mut matched = vec![false; other.rows];
        let mut left = Vec::with_capacity(self.rows);
        let mut right = Vec::with_capacity(self.rows);
        let mut keys = Vec::with_capacity(self.rows);
        for row in 0..self.rows {
            let key = self.index_key(row);
            let hit = lookup.get(&key).copied();
            if let Some(r) = hit {
                matched[r] = true;
            }
            left.push(Some(row));
            right.push(hit);
            keys.push(key);
        }
        for (row, _) in matched.iter().enumerate().filter(|(_, m)| !**m) {
            left.push(None);
            right.push(Some(row));
            keys.push(other.index_key(row));
        }

        let index = names
            .iter()
            .enumerate()
            .map(|(level, &name)| Column::new(name, keys.iter().map(|k| k[level].clone()).collect()))
            .collect();

        let mut columns: Vec<Column> = self.columns.iter().map(|c| c.gather(&left)).collect();
        columns.extend(other.columns.iter().map(|c| c.gather(&right)));

        Ok(Table { index, columns, rows: keys.len() })
    }
}

fn concat_index(parts: &[&Table]) -> Vec<Column> {
    let Some(first) = parts.first() else {
        return Vec::new();
    };
    let depth = first.index.len();
    if depth == 0 || parts.iter().any(|t| t.index.len() != depth) {
        return Vec::new();
    }
    (0..depth)
        .map(|level| {
            let name = &first.index[level].name;
            let name = if parts.iter().all(|t| t.index[level].name == *name) {
                name.clone()
            } else {
                format!("level_{level}")
            };
            let values = parts
                .iter()
                .flat_map(|t| t.index[level].values.iter().cloned())
                .collect();
            Column { name, values }
        })
        .collect()
}

// ── Display ───────────────────────────────────────────────────────────────────

/// Plain-text grid: index levels, a `|` separator, then data columns.
impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let all: Vec<&Column> = self.index.iter().chain(self.columns.iter()).collect();
        let cells: Vec<Vec<String>> = all
            .iter()
            .map(|c| c.values.iter().map(ToString::to_string).collect())
            .collect();
        let widths: Vec<usize> = all
            .iter()
            .zip(&cells)
            .map(|(c, vals)| vals.iter().map(String::len).chain([c.name.len()]).max().unwrap_or(0))
            .collect();

        let split = self.index.len();
        let header: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
        write_grid_row(f, &header, &widths, split)?;
        for r in 0..self.rows {
            let row: Vec<&str> = cells.iter().map(|c| c[r].as_str()).collect();
            write_grid_row(f, &row, &widths, split)?;
        }
        Ok(())
    }
}

fn write_grid_row(f: &mut fmt::Formatter<'_>, row: &[&str], widths: &[usize], split: usize) -> fmt::Result {
    for (i, (cell, &width)) in row.iter().zip(widths).enumerate() {
        if i > 0 {
            f.write_str(if i == split { " | " } else { "  " })?;
        }
        write!(f, "{cell:>width$}")?;
    }
    writeln!(f)
}
