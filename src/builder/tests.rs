use std::collections::{HashMap, HashSet};

use arrow::array::{Array, BooleanArray, Float64Array, Int32Array, ListArray};
use proptest::prelude::*;

use super::*;
use crate::row::{CellValue, RowRecord, SourceError};
use crate::schema::{FieldDescriptor, FieldKind, FieldShape};

/// In-memory row for driving the engine directly.
#[derive(Default)]
struct TestRow {
    scalars: HashMap<String, CellValue>,
    nulls: HashSet<String>,
    lists: HashMap<String, Vec<CellValue>>,
}

impl TestRow {
    fn scalar(mut self, name: &str, value: CellValue) -> Self {
        self.scalars.insert(name.to_string(), value);
        self
    }

    fn null(mut self, name: &str) -> Self {
        self.nulls.insert(name.to_string());
        self
    }

    fn list(mut self, name: &str, values: Vec<CellValue>) -> Self {
        self.lists.insert(name.to_string(), values);
        self
    }

    fn f64_list(self, name: &str, values: &[f64]) -> Self {
        self.list(
            name,
            values.iter().map(|&v| CellValue::Float64(v)).collect(),
        )
    }
}

impl RowRecord for TestRow {
    fn scalar(&self, field: &FieldDescriptor) -> Result<Option<CellValue>, SourceError> {
        if self.nulls.contains(&field.name) {
            return Ok(None);
        }
        Ok(self.scalars.get(&field.name).copied())
    }

    fn elements(&self, field: &FieldDescriptor) -> Result<Vec<CellValue>, SourceError> {
        Ok(self.lists.get(&field.name).cloned().unwrap_or_default())
    }
}

fn var_array(name: &str, kind: FieldKind, size_field: Option<&str>) -> FieldDescriptor {
    FieldDescriptor {
        name: name.to_string(),
        kind,
        shape: FieldShape::VariableArray {
            size_field: size_field.map(String::from),
        },
    }
}

fn fixed_array(name: &str, kind: FieldKind, width: usize) -> FieldDescriptor {
    FieldDescriptor {
        name: name.to_string(),
        kind,
        shape: FieldShape::FixedArray { width },
    }
}

fn list_column(table: &crate::table::ColumnarTable, name: &str) -> ListArray {
    let (_, column) = table.column_by_name(name).unwrap();
    column
        .as_any()
        .downcast_ref::<ListArray>()
        .unwrap()
        .clone()
}

#[test]
fn test_value_buffer_append_and_len() {
    let mut buffer = ValueBuffer::for_kind(FieldKind::Int32);
    assert_eq!(buffer.kind(), FieldKind::Int32);
    assert!(buffer.is_empty());

    buffer.try_append(CellValue::Int32(7)).unwrap();
    buffer.try_append(CellValue::Int32(8)).unwrap();
    assert_eq!(buffer.len(), 2);
    assert!(!buffer.is_empty());

    // A mismatched value is handed back untouched and appends nothing.
    assert_eq!(
        buffer.try_append(CellValue::Float64(1.0)),
        Err(CellValue::Float64(1.0))
    );
    assert_eq!(buffer.len(), 2);

    assert_eq!(buffer.finish().len(), 2);
}

#[test]
fn test_scalar_round_trip() {
    let schema = vec![FieldDescriptor::scalar("x", FieldKind::Float64)];
    let mut builder = TableBuilder::new(&schema);
    assert_eq!(builder.fields(), &schema[..]);
    for v in [1.0, 2.0, 3.0] {
        builder
            .observe(&TestRow::default().scalar("x", CellValue::Float64(v)))
            .unwrap();
    }
    assert_eq!(builder.rows(), 3);
    let table = builder.finalize().unwrap();
    assert_eq!(table.num_rows(), 3);

    let (_, column) = table.column_by_name("x").unwrap();
    let values = column.as_any().downcast_ref::<Float64Array>().unwrap();
    assert_eq!(&values.values()[..], &[1.0, 2.0, 3.0]);
}

#[test]
fn test_variable_array_offsets() {
    // The canonical three-row example: [[1,2], [], [3,4,5]].
    let schema = vec![
        FieldDescriptor::scalar("x", FieldKind::Float64),
        var_array("ys", FieldKind::Float64, None),
    ];
    let mut builder = TableBuilder::new(&schema);
    builder
        .observe(
            &TestRow::default()
                .scalar("x", CellValue::Float64(1.0))
                .f64_list("ys", &[1.0, 2.0]),
        )
        .unwrap();
    builder
        .observe(
            &TestRow::default()
                .scalar("x", CellValue::Float64(2.0))
                .f64_list("ys", &[]),
        )
        .unwrap();
    builder
        .observe(
            &TestRow::default()
                .scalar("x", CellValue::Float64(3.0))
                .f64_list("ys", &[3.0, 4.0, 5.0]),
        )
        .unwrap();
    let table = builder.finalize().unwrap();

    let ys = list_column(&table, "ys");
    assert_eq!(ys.value_offsets(), &[0, 2, 2, 5]);
    let values = ys
        .values()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(&values.values()[..], &[1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn test_size_field_governs_element_count() {
    let schema = vec![
        FieldDescriptor::scalar("nhit", FieldKind::Int32),
        var_array("energy", FieldKind::Float64, Some("nhit")),
    ];
    let mut builder = TableBuilder::new(&schema);
    // The row carries three elements but declares only two valid.
    builder
        .observe(
            &TestRow::default()
                .scalar("nhit", CellValue::Int32(2))
                .f64_list("energy", &[10.0, 20.0, 30.0]),
        )
        .unwrap();
    let table = builder.finalize().unwrap();

    let energy = list_column(&table, "energy");
    assert_eq!(energy.value_offsets(), &[0, 2]);
}

#[test]
fn test_size_field_declared_after_array() {
    // Sizing still works when the array precedes its sizing field in
    // declaration order: scalars materialize first within each row.
    let schema = vec![
        var_array("energy", FieldKind::Float64, Some("nhit")),
        FieldDescriptor::scalar("nhit", FieldKind::Int32),
    ];
    let mut builder = TableBuilder::new(&schema);
    builder
        .observe(
            &TestRow::default()
                .scalar("nhit", CellValue::Int32(1))
                .f64_list("energy", &[10.0, 20.0]),
        )
        .unwrap();
    let table = builder.finalize().unwrap();

    let energy = list_column(&table, "energy");
    assert_eq!(energy.value_offsets(), &[0, 1]);
}

#[test]
fn test_fixed_array_truncates_no_padding() {
    let schema = vec![fixed_array("samples", FieldKind::Int32, 3)];
    let mut builder = TableBuilder::new(&schema);
    // Longer than the declared width: truncated.
    builder
        .observe(&TestRow::default().list(
            "samples",
            vec![
                CellValue::Int32(1),
                CellValue::Int32(2),
                CellValue::Int32(3),
                CellValue::Int32(4),
            ],
        ))
        .unwrap();
    // Shorter: appended as-is, no padding in the forward direction.
    builder
        .observe(
            &TestRow::default().list("samples", vec![CellValue::Int32(9)]),
        )
        .unwrap();
    let table = builder.finalize().unwrap();

    let samples = list_column(&table, "samples");
    assert_eq!(samples.value_offsets(), &[0, 3, 4]);
    let values = samples
        .values()
        .as_any()
        .downcast_ref::<Int32Array>()
        .unwrap();
    assert_eq!(&values.values()[..], &[1, 2, 3, 9]);
}

#[test]
fn test_bool_validity() {
    let schema = vec![FieldDescriptor::scalar("flag", FieldKind::Bool)];
    let mut builder = TableBuilder::new(&schema);
    builder
        .observe(&TestRow::default().scalar("flag", CellValue::Bool(true)))
        .unwrap();
    builder.observe(&TestRow::default().null("flag")).unwrap();
    let table = builder.finalize().unwrap();

    let (_, column) = table.column_by_name("flag").unwrap();
    let flags = column.as_any().downcast_ref::<BooleanArray>().unwrap();
    assert!(flags.value(0));
    assert!(flags.is_null(1));
}

#[test]
fn test_missing_scalar_is_error() {
    let schema = vec![FieldDescriptor::scalar("x", FieldKind::Float64)];
    let mut builder = TableBuilder::new(&schema);
    let result = builder.observe(&TestRow::default());
    assert!(matches!(result, Err(BuildError::MissingScalar { .. })));
}

#[test]
fn test_kind_mismatch_is_error() {
    let schema = vec![FieldDescriptor::scalar("x", FieldKind::Float64)];
    let mut builder = TableBuilder::new(&schema);
    let result = builder.observe(&TestRow::default().scalar("x", CellValue::Int32(1)));
    assert!(matches!(
        result,
        Err(BuildError::KindMismatch {
            expected: FieldKind::Float64,
            found: FieldKind::Int32,
            ..
        })
    ));
}

#[test]
fn test_observe_after_finalize_is_invalid_state() {
    let schema = vec![FieldDescriptor::scalar("x", FieldKind::Float64)];
    let mut builder = TableBuilder::new(&schema);
    builder
        .observe(&TestRow::default().scalar("x", CellValue::Float64(1.0)))
        .unwrap();
    builder.finalize().unwrap();

    let result = builder.observe(&TestRow::default().scalar("x", CellValue::Float64(2.0)));
    assert!(matches!(result, Err(BuildError::InvalidState)));
    assert!(matches!(builder.finalize(), Err(BuildError::InvalidState)));
}

proptest! {
    /// Offsets of a finalized variable-array column are non-decreasing,
    /// start at 0, and end at the total element count, for any row shape.
    #[test]
    fn prop_offsets_invariants(rows in prop::collection::vec(
        prop::collection::vec(any::<f64>(), 0..10),
        0..20,
    )) {
        let schema = vec![var_array("ys", FieldKind::Float64, None)];
        let mut builder = TableBuilder::new(&schema);
        for row in &rows {
            builder
                .observe(&TestRow::default().f64_list("ys", row))
                .unwrap();
        }
        let table = builder.finalize().unwrap();
        let ys = list_column(&table, "ys");
        let offsets = ys.value_offsets();

        prop_assert_eq!(offsets[0], 0);
        prop_assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        let total: usize = rows.iter().map(Vec::len).sum();
        prop_assert_eq!(offsets[offsets.len() - 1] as usize, total);
        prop_assert_eq!(ys.values().len(), total);
    }
}
