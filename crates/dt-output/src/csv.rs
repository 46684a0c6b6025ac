//! Columnar-text (CSV) codec for tables.
//!
//! # Writing
//!
//! Named index levels come first, then data columns, under a single header
//! row.  A positional index is not written.
//!
//! | Cell          | Text                                     |
//! |---------------|------------------------------------------|
//! | `Null`        | empty field                              |
//! | `Bool`        | `True` / `False`                         |
//! | `Float`       | always with `.` or exponent (`1.0`, `1e-7`) |
//! | `List`        | JSON array text                          |
//!
//! # Reading
//!
//! One type is inferred per column from its non-empty fields: all integers
//! → `Int`, all numbers → `Float`, all `true`/`false` in any case → `Bool`,
//! otherwise `Str`.  Empty fields read as `Null`.  Columns whose names appear
//! in `index_names` are promoted to index levels, in `index_names` order.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use dt_table::{Column, Table, Value};

use crate::json::value_to_json;
use crate::OutputResult;

// ── Writing ───────────────────────────────────────────────────────────────────

pub fn write_table<W: Write>(writer: W, table: &Table) -> OutputResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let all: Vec<&Column> = table.index().iter().chain(table.columns()).collect();

    csv_writer.write_record(all.iter().map(|c| c.name.as_str()))?;
    for row in 0..table.num_rows() {
        csv_writer.write_record(all.iter().map(|c| format_cell(&c.values[row])))?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_table_file(path: &Path, table: &Table) -> OutputResult<()> {
    write_table(File::create(path)?, table)
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_owned(),
        Value::Bool(false) => "False".to_owned(),
        Value::Int(i) => i.to_string(),
        // Debug keeps the decimal point on whole numbers.
        Value::Float(f) => format!("{f:?}"),
        Value::Str(s) => s.clone(),
        Value::List(_) => value_to_json(value).to_string(),
    }
}

// ── Reading ───────────────────────────────────────────────────────────────────

pub fn read_table<R: Read>(reader: R, index_names: &[&str]) -> OutputResult<Table> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_owned).collect();

    let mut fields: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in csv_reader.records() {
        let record = record?;
        for (column, field) in fields.iter_mut().zip(record.iter()) {
            column.push(field.to_owned());
        }
    }

    let mut table = Table::new();
    for (name, column) in headers.into_iter().zip(fields) {
        table.push_column(name, infer_column(&column))?;
    }

    let index: Vec<&str> = index_names
        .iter()
        .copied()
        .filter(|name| table.contains_column(name))
        .collect();
    if index.is_empty() {
        Ok(table)
    } else {
        Ok(table.set_index(&index)?)
    }
}

pub fn read_table_file(path: &Path, index_names: &[&str]) -> OutputResult<Table> {
    read_table(File::open(path)?, index_names)
}

fn infer_column(fields: &[String]) -> Vec<Value> {
    let present = || fields.iter().filter(|f| !f.is_empty());

    if present().all(|f| f.parse::<i64>().is_ok()) {
        map_present(fields, |s| s.parse().map_or(Value::Null, Value::Int))
    } else if present().all(|f| f.parse::<f64>().is_ok()) {
        map_present(fields, |s| s.parse().map_or(Value::Null, Value::Float))
    } else if present().all(|f| parse_bool(f).is_some()) {
        map_present(fields, |s| parse_bool(s).map_or(Value::Null, Value::Bool))
    } else {
        map_present(fields, |s| Value::Str(s.to_owned()))
    }
}

fn map_present(fields: &[String], cell: impl Fn(&str) -> Value) -> Vec<Value> {
    fields
        .iter()
        .map(|f| if f.is_empty() { Value::Null } else { cell(f.as_str()) })
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
