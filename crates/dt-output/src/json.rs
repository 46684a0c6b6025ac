//! Structured-text (JSON) codec for mappings and scalar entries.
//!
//! Cells convert to JSON natively: `Int` → integer, `Float` → number
//! (non-finite floats → `null`), `List` → array.  Decoding goes the other
//! way; JSON objects nested inside a mapping value have no cell equivalent
//! and decode to their JSON text, and integers above `i64::MAX` decode to
//! `Float` (settings read straight from a [`Mapping`] keep them exact).

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use dt_table::Value;
use serde_json::Number;

use crate::data_dict::{Entry, Mapping};
use crate::OutputResult;

/// Encode a cell as JSON.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => Number::from_f64(*f).map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(value_to_json).collect()),
    }
}

/// Decode a JSON value into a cell.
pub fn value_from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map_or(Value::Null, Value::Float)
            }
        }
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(value_from_json).collect()),
        serde_json::Value::Object(_) => Value::Str(json.to_string()),
    }
}

// ── Recording settings ────────────────────────────────────────────────────────

/// Conversion of a recorded setting into JSON.
///
/// Integers stay exact wherever JSON can hold them (anything in the `i64` or
/// `u64` range); only `i128`/`u128` values beyond that become floats.
pub trait IntoJson {
    fn into_json(self) -> serde_json::Value;
}

macro_rules! into_json_number {
    ($($t:ty),*) => {$(
        impl IntoJson for $t {
            #[inline]
            fn into_json(self) -> serde_json::Value {
                serde_json::Value::Number(self.into())
            }
        }
    )*};
}

macro_rules! into_json_wide {
    ($($t:ty),*) => {$(
        impl IntoJson for $t {
            fn into_json(self) -> serde_json::Value {
                if let Ok(i) = i64::try_from(self) {
                    i.into_json()
                } else if let Ok(u) = u64::try_from(self) {
                    u.into_json()
                } else {
                    (self as f64).into_json()
                }
            }
        }
    )*};
}

into_json_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
into_json_wide!(i128, u128);

impl IntoJson for f64 {
    fn into_json(self) -> serde_json::Value {
        Number::from_f64(self).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}

impl IntoJson for f32 {
    fn into_json(self) -> serde_json::Value {
        f64::from(self).into_json()
    }
}

impl IntoJson for bool {
    fn into_json(self) -> serde_json::Value {
        serde_json::Value::Bool(self)
    }
}

impl IntoJson for &str {
    fn into_json(self) -> serde_json::Value {
        serde_json::Value::String(self.to_owned())
    }
}

impl IntoJson for String {
    fn into_json(self) -> serde_json::Value {
        serde_json::Value::String(self)
    }
}

impl IntoJson for Value {
    fn into_json(self) -> serde_json::Value {
        value_to_json(&self)
    }
}

impl<T: IntoJson> IntoJson for Option<T> {
    fn into_json(self) -> serde_json::Value {
        self.map_or(serde_json::Value::Null, IntoJson::into_json)
    }
}

impl<T: IntoJson> IntoJson for Vec<T> {
    fn into_json(self) -> serde_json::Value {
        serde_json::Value::Array(self.into_iter().map(IntoJson::into_json).collect())
    }
}

/// Build a [`Mapping`] from settings of any numeric width: `u8`, `u64`,
/// `i128`, `f32`, `Vec<u16>`, … all land as plain JSON numbers and arrays.
pub fn mapping_from<I, K, V>(pairs: I) -> Mapping
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: IntoJson,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into_json()))
        .collect()
}

pub fn write_mapping<W: Write>(writer: W, mapping: &Mapping) -> OutputResult<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer(&mut writer, mapping)?;
    writer.flush()?;
    Ok(())
}

pub fn write_mapping_file(path: &Path, mapping: &Mapping) -> OutputResult<()> {
    write_mapping(File::create(path)?, mapping)
}

/// Decode a JSON document: objects become [`Entry::Mapping`], anything else
/// [`Entry::Scalar`].
pub fn read_entry<R: Read>(reader: R) -> OutputResult<Entry> {
    let json: serde_json::Value = serde_json::from_reader(BufReader::new(reader))?;
    Ok(match json {
        serde_json::Value::Object(map) => Entry::Mapping(map),
        other => Entry::Scalar(value_from_json(&other)),
    })
}

pub fn read_entry_file(path: &Path) -> OutputResult<Entry> {
    read_entry(File::open(path)?)
}
