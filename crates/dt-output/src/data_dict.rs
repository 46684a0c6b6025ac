//! `DataDict`: the ordered, tagged container holding one run's or one
//! experiment's recorded output.
//!
//! # Layout
//!
//! ```text
//! DataDict
//! ├── "log"         Mapping   name, time stamps, iterations, settings
//! ├── "parameters"  Mapping | Table | DataDict { "fixed": Mapping, "varied": Table }
//! ├── "variables"   Table | DataDict { <obj_type>: Table, … }
//! └── "measures"    Table     one row per run
//! ```
//!
//! Keys are free-form; the four above are the sections the arrangement
//! engine understands.  Each one has a named accessor ([`DataDict::log`],
//! [`DataDict::parameters`], …) that reads the same backing store as
//! [`DataDict::get`] and `data["key"]`.

use std::fmt;
use std::ops::Index;

use dt_table::{Table, Value};

use crate::{OutputError, OutputResult};

/// Section keys understood by the arrangement engine.
pub const LOG: &str = "log";
pub const PARAMETERS: &str = "parameters";
pub const VARIABLES: &str = "variables";
pub const MEASURES: &str = "measures";

/// A structured-text mapping (log, fixed parameters, settings).
///
/// Insertion ordered; see the `preserve_order` feature of `serde_json`.
pub type Mapping = serde_json::Map<String, serde_json::Value>;

// ── Entry ─────────────────────────────────────────────────────────────────────

/// One value stored in a [`DataDict`].
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    Table(Table),
    Dict(DataDict),
    Mapping(Mapping),
    Scalar(Value),
}

impl Entry {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Entry::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DataDict> {
        match self {
            Entry::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Entry::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Entry::Scalar(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Table> for Entry {
    fn from(t: Table) -> Self {
        Entry::Table(t)
    }
}

impl From<DataDict> for Entry {
    fn from(d: DataDict) -> Self {
        Entry::Dict(d)
    }
}

impl From<Mapping> for Entry {
    fn from(m: Mapping) -> Self {
        Entry::Mapping(m)
    }
}

impl From<Value> for Entry {
    fn from(v: Value) -> Self {
        Entry::Scalar(v)
    }
}

// ── DataDict ──────────────────────────────────────────────────────────────────

/// Ordered `key → Entry` map.
///
/// Backed by a `Vec` because containers hold a handful of sections and key
/// order is part of the saved and displayed output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataDict {
    entries: Vec<(String, Entry)>,
}

impl DataDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy when assembling a container by hand.
    pub fn with(mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Self {
        self.insert(key, entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> + '_ {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.position(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.position(key).map(|i| &mut self.entries[i].1)
    }

    /// Insert or replace.  A replaced entry keeps its position and the old
    /// value is returned.
    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<Entry>) -> Option<Entry> {
        let key = key.into();
        let entry = entry.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, entry)),
            None => {
                self.entries.push((key, entry));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// The nested container at `key`, created empty if absent.
    ///
    /// Fails if `key` already holds something other than a `DataDict`.
    pub fn dict_entry(&mut self, key: &str) -> OutputResult<&mut DataDict> {
        let i = match self.position(key) {
            Some(i) => i,
            None => {
                self.entries.push((key.to_owned(), Entry::Dict(DataDict::new())));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[i].1 {
            Entry::Dict(d) => Ok(d),
            _ => Err(OutputError::SectionType {
                key:      key.to_owned(),
                expected: "a nested DataDict",
            }),
        }
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    // ── Typed access ──────────────────────────────────────────────────────

    pub fn table(&self, key: &str) -> Option<&Table> {
        self.get(key).and_then(Entry::as_table)
    }

    pub fn dict(&self, key: &str) -> Option<&DataDict> {
        self.get(key).and_then(Entry::as_dict)
    }

    pub fn mapping(&self, key: &str) -> Option<&Mapping> {
        self.get(key).and_then(Entry::as_mapping)
    }

    // ── Named sections ────────────────────────────────────────────────────

    /// Run metadata, if present as a mapping.
    pub fn log(&self) -> Option<&Mapping> {
        self.mapping(LOG)
    }

    pub fn parameters(&self) -> Option<&Entry> {
        self.get(PARAMETERS)
    }

    pub fn variables(&self) -> Option<&Entry> {
        self.get(VARIABLES)
    }

    pub fn measures(&self) -> Option<&Table> {
        self.table(MEASURES)
    }

    // ── Display ───────────────────────────────────────────────────────────

    fn fmt_entries(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "    ".repeat(depth);
        for (key, entry) in self.iter() {
            write!(f, "\n{indent}'{key}': ")?;
            match entry {
                Entry::Table(t) => {
                    let (c, r) = (t.num_columns(), t.num_rows());
                    write!(f, "DataFrame with {c} variable{} and {r} row{}", plural(c), plural(r))?;
                }
                Entry::Dict(d) => d.fmt_entries(f, depth + 1)?,
                Entry::Mapping(m) => {
                    let n = m.len();
                    write!(f, "Dictionary with {n} key{}", plural(n))?;
                }
                Entry::Scalar(Value::List(items)) => {
                    let n = items.len();
                    write!(f, "List with {n} entr{}", if n == 1 { "y" } else { "ies" })?;
                }
                Entry::Scalar(v) => write!(f, "Object of type {}", v.type_name())?,
            }
        }
        Ok(())
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Summary tree, one line per entry.
///
/// ```text
/// DataDict {
/// 'log': Dictionary with 4 keys
/// 'variables':
///     'Agent': DataFrame with 2 variables and 30 rows
///     'Env': DataFrame with 1 variable and 10 rows
/// }
/// ```
impl fmt::Display for DataDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataDict {")?;
        self.fmt_entries(f, 0)?;
        f.write_str("\n}")
    }
}

impl Index<&str> for DataDict {
    type Output = Entry;

    /// # Panics
    /// Panics if `key` is absent; use [`DataDict::get`] to check first.
    fn index(&self, key: &str) -> &Entry {
        match self.get(key) {
            Some(entry) => entry,
            None => panic!("DataDict has no key '{key}'"),
        }
    }
}

impl<K: Into<String>, E: Into<Entry>> FromIterator<(K, E)> for DataDict {
    fn from_iter<I: IntoIterator<Item = (K, E)>>(iter: I) -> Self {
        let mut dict = DataDict::new();
        for (k, e) in iter {
            dict.insert(k, e);
        }
        dict
    }
}
