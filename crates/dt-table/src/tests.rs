//! Unit tests for dt-table primitives.

#[cfg(test)]
fn ints(vals: &[i64]) -> Vec<crate::Value> {
    vals.iter().copied().map(crate::Value::Int).collect()
}

#[cfg(test)]
mod value_tests {
    use std::collections::HashSet;

    use crate::Value;

    #[test]
    fn integer_widths_coerce_to_int() {
        assert_eq!(Value::from(7u8), Value::Int(7));
        assert_eq!(Value::from(-7i16), Value::Int(-7));
        assert_eq!(Value::from(u32::MAX), Value::Int(u32::MAX as i64));
        assert_eq!(Value::from(42usize), Value::Int(42));
        assert_eq!(Value::from(42i128), Value::Int(42));
    }

    #[test]
    fn oversized_integers_fall_back_to_float() {
        assert_eq!(Value::from(u64::MAX), Value::Float(u64::MAX as f64));
        assert_eq!(Value::from(i128::MAX), Value::Float(i128::MAX as f64));
    }

    #[test]
    fn floats_and_arrays() {
        assert_eq!(Value::from(0.5f32), Value::Float(0.5));
        assert_eq!(
            Value::from(vec![1u8, 2, 3]),
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn int_and_float_are_distinct() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::Int(1).as_f64(), Some(1.0));
        assert_eq!(Value::Float(2.0).as_i64(), Some(2));
        assert_eq!(Value::Float(2.5).as_i64(), None);
    }

    #[test]
    fn hashable_as_key() {
        let mut set = HashSet::new();
        set.insert(Value::Float(0.1));
        set.insert(Value::Float(0.1));
        set.insert(Value::from("a"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display() {
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(Value::Null.to_string(), "null");
    }
}

#[cfg(test)]
mod construction_tests {
    use super::ints;
    use crate::{Table, TableError, Value};

    #[test]
    fn from_columns_sets_row_count() {
        let t = Table::from_columns([("a", ints(&[1, 2, 3])), ("b", ints(&[4, 5, 6]))]).unwrap();
        assert_eq!(t.num_rows(), 3);
        assert_eq!(t.column_names(), ["a", "b"]);
        assert!(t.index().is_empty());
    }

    #[test]
    fn length_mismatch_rejected() {
        let err = Table::from_columns([("a", ints(&[1, 2])), ("b", ints(&[1]))]).unwrap_err();
        assert!(matches!(err, TableError::LengthMismatch { expected: 2, got: 1, .. }));
    }

    #[test]
    fn duplicate_column_rejected() {
        let err = Table::from_columns([("a", ints(&[1])), ("a", ints(&[2]))]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(ref n) if n == "a"));
    }

    #[test]
    fn broadcast_adds_and_replaces() {
        let mut t = Table::from_columns([("a", ints(&[1, 2]))]).unwrap();
        t.insert_broadcast("k", Value::from("x"));
        assert_eq!(t.column("k").unwrap(), [Value::from("x"), Value::from("x")]);
        t.insert_broadcast("a", Value::Int(0));
        assert_eq!(t.column("a").unwrap(), ints(&[0, 0]).as_slice());
        assert_eq!(t.column_names(), ["a", "k"]);
    }
}

#[cfg(test)]
mod index_tests {
    use super::ints;
    use crate::{Table, TableError, Value};

    fn ts() -> Table {
        Table::from_columns([
            ("obj_id", ints(&[1, 1, 2])),
            ("t", ints(&[0, 1, 0])),
            ("x", ints(&[10, 11, 20])),
        ])
        .unwrap()
        .set_index(&["obj_id", "t"])
        .unwrap()
    }

    #[test]
    fn set_index_moves_columns() {
        let t = ts();
        assert_eq!(t.index_names(), ["obj_id", "t"]);
        assert_eq!(t.column_names(), ["x"]);
        assert!(t.is_multi_index());
        assert_eq!(t.index_key(2), ints(&[2, 0]));
    }

    #[test]
    fn set_index_missing_name() {
        let err = ts().set_index(&["nope"]).unwrap_err();
        assert!(matches!(err, TableError::ColumnNotFound(ref n) if n == "nope"));
    }

    #[test]
    fn reset_index_puts_levels_first() {
        let flat = ts().reset_index().unwrap();
        assert_eq!(flat.column_names(), ["obj_id", "t", "x"]);
        assert!(flat.index().is_empty());
    }

    #[test]
    fn range_index() {
        let t = Table::from_columns([("a", ints(&[5, 6, 7]))]).unwrap().with_range_index("run_id");
        assert_eq!(t.index_level("run_id").unwrap(), ints(&[0, 1, 2]).as_slice());
        assert_eq!(t.get(1, "run_id"), Some(&Value::Int(1)));
    }
}

#[cfg(test)]
mod reshape_tests {
    use super::ints;
    use crate::{Table, TableError, Value};

    #[test]
    fn select_projects_and_errors() {
        let t = Table::from_columns([("a", ints(&[1])), ("b", ints(&[2]))]).unwrap();
        assert_eq!(t.select(&["b"]).unwrap().column_names(), ["b"]);
        let err = t.select(&["c"]).unwrap_err();
        assert!(matches!(err, TableError::ColumnNotFound(ref n) if n == "c"));
    }

    #[test]
    fn concat_rows_fills_holes() {
        let a = Table::from_columns([("x", ints(&[1, 2]))]).unwrap();
        let b = Table::from_columns([("y", ints(&[3]))]).unwrap();
        let c = Table::concat_rows(&[&a, &b]);
        assert_eq!(c.num_rows(), 3);
        assert_eq!(c.column("x").unwrap(), [Value::Int(1), Value::Int(2), Value::Null]);
        assert_eq!(c.column("y").unwrap(), [Value::Null, Value::Null, Value::Int(3)]);
    }

    #[test]
    fn concat_keyed_adds_outer_level() {
        let a = Table::from_columns([("id", ints(&[1, 2])), ("x", ints(&[0, 0]))])
            .unwrap()
            .set_index(&["id"])
            .unwrap();
        let b = Table::from_columns([("id", ints(&[1])), ("y", ints(&[5]))])
            .unwrap()
            .set_index(&["id"])
            .unwrap();
        let c = Table::concat_keyed(&[("A", &a), ("B", &b)], "obj_type");
        assert_eq!(c.index_names(), ["obj_type", "id"]);
        assert_eq!(
            c.index_level("obj_type").unwrap(),
            [Value::from("A"), Value::from("A"), Value::from("B")]
        );
        assert_eq!(c.column_names(), ["x", "y"]);
    }

    #[test]
    fn repeat_stacks_copies_in_order() {
        let t = Table::from_columns([("a", ints(&[1, 2]))]).unwrap().repeat(3);
        assert_eq!(t.column("a").unwrap(), ints(&[1, 2, 1, 2, 1, 2]).as_slice());
        assert!(Table::from_columns([("a", ints(&[1]))]).unwrap().repeat(0).is_empty());
    }

    #[test]
    fn filter_in_on_column_and_level() {
        let t = Table::from_columns([
            ("scenario", vec![Value::from("a"), Value::from("b"), Value::from("a")]),
            ("x", ints(&[1, 2, 3])),
        ])
        .unwrap();
        let kept = t.filter_in("scenario", &[Value::from("a")]).unwrap();
        assert_eq!(kept.column("x").unwrap(), ints(&[1, 3]).as_slice());

        let indexed = t.set_index(&["scenario"]).unwrap();
        let kept = indexed.filter_in("scenario", &[Value::from("b")]).unwrap();
        assert_eq!(kept.num_rows(), 1);

        assert!(t.filter_in("missing", &[]).is_err());
    }
}

#[cfg(test)]
mod align_tests {
    use super::ints;
    use crate::{Table, TableError, Value, POSITIONAL_LEVEL};

    fn params() -> Table {
        Table::from_columns([("a", ints(&[100, 200]))]).unwrap().with_range_index("run_id")
    }

    fn series() -> Table {
        Table::from_columns([
            ("run_id", ints(&[0, 0, 1, 1])),
            ("t", ints(&[0, 1, 0, 1])),
            ("x", ints(&[1, 2, 3, 4])),
        ])
        .unwrap()
        .set_index(&["run_id", "t"])
        .unwrap()
    }

    #[test]
    fn reindex_broadcasts_by_level() {
        let spread = params().reindex_on_level(&series(), "run_id").unwrap();
        assert_eq!(spread.index_names(), ["run_id", "t"]);
        assert_eq!(spread.column("a").unwrap(), ints(&[100, 100, 200, 200]).as_slice());
    }

    #[test]
    fn reindex_missing_level() {
        let err = params().reindex_on_level(&series(), "sample_id").unwrap_err();
        assert!(matches!(err, TableError::LevelNotFound(_)));
    }

    #[test]
    fn join_identical_index_is_side_by_side() {
        let s = series();
        let spread = params().reindex_on_level(&s, "run_id").unwrap();
        let joined = s.join_columns(&spread).unwrap();
        assert_eq!(joined.column_names(), ["x", "a"]);
        assert_eq!(joined.num_rows(), 4);
    }

    #[test]
    fn join_aligns_on_keys() {
        let left = Table::from_columns([("run_id", ints(&[1, 0])), ("m", ints(&[7, 6]))])
            .unwrap()
            .set_index(&["run_id"])
            .unwrap();
        let right = Table::from_columns([("a", ints(&[10, 11, 12]))])
            .unwrap()
            .with_range_index("run_id");
        let joined = left.join_columns(&right).unwrap();
        assert_eq!(joined.num_rows(), 3);
        assert_eq!(joined.index_level("run_id").unwrap(), ints(&[1, 0, 2]).as_slice());
        assert_eq!(joined.column("a").unwrap(), ints(&[11, 10, 12]).as_slice());
        assert_eq!(joined.column("m").unwrap(), [Value::Int(7), Value::Int(6), Value::Null]);
    }

    #[test]
    fn join_positional_with_named_level() {
        let left = Table::from_columns([("run_id", ints(&[0, 1])), ("m", ints(&[6, 7]))]).unwrap();
        let right = Table::from_columns([("a", ints(&[10, 11]))])
            .unwrap()
            .with_range_index("run_id");
        let joined = left.join_columns(&right).unwrap();
        assert_eq!(joined.index_names(), [POSITIONAL_LEVEL]);
        assert_eq!(joined.column_names(), ["run_id", "m", "a"]);
        assert_eq!(joined.column("a").unwrap(), ints(&[10, 11]).as_slice());
        assert_eq!(
            joined.reset_index().unwrap().column_names(),
            [POSITIONAL_LEVEL, "run_id", "m", "a"]
        );
    }

    #[test]
    fn join_rejects_differently_named_levels() {
        let left = Table::new().with_range_index("obj_type");
        let right = Table::from_columns([("a", ints(&[10, 11]))])
            .unwrap()
            .with_range_index("run_id");
        let err = left.join_columns(&right).unwrap_err();
        assert!(matches!(
            err,
            TableError::IndexMismatch { ref left, ref right } if left == &["obj_type"] && right == &["run_id"]
        ));
    }

    #[test]
    fn join_rejects_clashing_columns() {
        let t = params();
        assert!(matches!(t.join_columns(&t), Err(TableError::DuplicateColumn(_))));
    }
}
