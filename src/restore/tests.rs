use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int32Array, ListBuilder};

use super::*;
use crate::row::{OutputCell, OutputRow};
use crate::schema::{FieldDescriptor, FieldShape};

fn f64_scalar(name: &str, values: &[f64]) -> (FieldDescriptor, ArrayRef) {
    (
        FieldDescriptor::scalar(name, FieldKind::Float64),
        Arc::new(Float64Array::from(values.to_vec())),
    )
}

fn i32_scalar(name: &str, values: &[i32]) -> (FieldDescriptor, ArrayRef) {
    (
        FieldDescriptor::scalar(name, FieldKind::Int32),
        Arc::new(Int32Array::from(values.to_vec())),
    )
}

fn f64_list(name: &str, rows: &[&[f64]]) -> (FieldDescriptor, ArrayRef) {
    let mut builder = ListBuilder::new(arrow::array::Float64Builder::new());
    for row in rows {
        builder.values().append_slice(row);
        builder.append(true);
    }
    (
        FieldDescriptor {
            name: name.to_string(),
            kind: FieldKind::Float64,
            shape: FieldShape::VariableArray { size_field: None },
        },
        Arc::new(builder.finish()),
    )
}

fn i32_list(name: &str, rows: &[&[i32]]) -> (FieldDescriptor, ArrayRef) {
    let mut builder = ListBuilder::new(arrow::array::Int32Builder::new());
    for row in rows {
        builder.values().append_slice(row);
        builder.append(true);
    }
    (
        FieldDescriptor {
            name: name.to_string(),
            kind: FieldKind::Int32,
            shape: FieldShape::VariableArray { size_field: None },
        },
        Arc::new(builder.finish()),
    )
}

fn table(columns: Vec<(FieldDescriptor, ArrayRef)>) -> ColumnarTable {
    let (fields, arrays) = columns.into_iter().unzip();
    ColumnarTable::new(fields, arrays).unwrap()
}

fn f64s(values: &[f64]) -> Vec<CellValue> {
    values.iter().map(|&v| CellValue::Float64(v)).collect()
}

fn rows_of(restorer: &Restorer) -> Vec<OutputRow> {
    restorer
        .emit_rows()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn test_emit_before_plan_is_invalid_state() {
    let mut restorer = Restorer::new();
    assert!(matches!(
        restorer.emit_rows(),
        Err(RestoreError::InvalidState(_))
    ));
    restorer
        .add_shard("a", table(vec![f64_scalar("x", &[1.0])]))
        .unwrap();
    assert!(matches!(
        restorer.emit_rows(),
        Err(RestoreError::InvalidState(_))
    ));
}

#[test]
fn test_plan_without_shards_is_invalid_state() {
    let mut restorer = Restorer::new();
    assert!(matches!(
        restorer.plan_layout(),
        Err(RestoreError::InvalidState(_))
    ));
}

#[test]
fn test_add_shard_after_plan_is_invalid_state() {
    let mut restorer = Restorer::new();
    restorer
        .add_shard("a", table(vec![f64_scalar("x", &[1.0])]))
        .unwrap();
    restorer.plan_layout().unwrap();
    let result = restorer.add_shard("b", table(vec![f64_scalar("x", &[2.0])]));
    assert!(matches!(result, Err(RestoreError::InvalidState(_))));
}

#[test]
fn test_canonical_example_reconstruction() {
    // x = [1,2,3], ys = [[1,2], [], [3,4,5]] reconstructs with width 3 into
    // [1,2,0], [0,0,0], [3,4,5].
    let mut restorer = Restorer::new();
    restorer
        .add_shard(
            "run0001.parquet",
            table(vec![
                f64_scalar("x", &[1.0, 2.0, 3.0]),
                f64_list("ys", &[&[1.0, 2.0], &[], &[3.0, 4.0, 5.0]]),
            ]),
        )
        .unwrap();

    let slots = restorer.plan_layout().unwrap().to_vec();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[1].width, Some(3));

    let rows = rows_of(&restorer);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].cells[0], OutputCell::Scalar(CellValue::Float64(1.0)));
    assert_eq!(rows[0].cells[1], OutputCell::Array(f64s(&[1.0, 2.0, 0.0])));
    assert_eq!(rows[1].cells[1], OutputCell::Array(f64s(&[0.0, 0.0, 0.0])));
    assert_eq!(rows[2].cells[1], OutputCell::Array(f64s(&[3.0, 4.0, 5.0])));
}

#[test]
fn test_width_is_max_across_shards() {
    let mut restorer = Restorer::new();
    restorer
        .add_shard("a", table(vec![f64_list("ys", &[&[1.0, 2.0]])]))
        .unwrap();
    restorer
        .add_shard(
            "b",
            table(vec![f64_list("ys", &[&[3.0, 4.0, 5.0, 6.0], &[7.0]])]),
        )
        .unwrap();

    let slots = restorer.plan_layout().unwrap().to_vec();
    assert_eq!(slots[0].width, Some(4));

    // Shard order then row order; short rows are padded to the global width.
    let rows = rows_of(&restorer);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].cells[0], OutputCell::Array(f64s(&[1.0, 2.0, 0.0, 0.0])));
    assert_eq!(rows[1].cells[0], OutputCell::Array(f64s(&[3.0, 4.0, 5.0, 6.0])));
    assert_eq!(rows[2].cells[0], OutputCell::Array(f64s(&[7.0, 0.0, 0.0, 0.0])));
}

#[test]
fn test_width_floor_is_one() {
    let mut restorer = Restorer::new();
    restorer
        .add_shard("a", table(vec![f64_list("ys", &[&[], &[]])]))
        .unwrap();
    let slots = restorer.plan_layout().unwrap().to_vec();
    assert_eq!(slots[0].width, Some(1));

    let rows = rows_of(&restorer);
    assert_eq!(rows[0].cells[0], OutputCell::Array(f64s(&[0.0])));
}

#[test]
fn test_missing_field_reads_as_default() {
    let mut restorer = Restorer::new();
    restorer
        .add_shard(
            "a",
            table(vec![
                f64_scalar("x", &[1.0]),
                i32_scalar("run", &[42]),
            ]),
        )
        .unwrap();
    restorer
        .add_shard("b", table(vec![f64_scalar("x", &[2.0])]))
        .unwrap();

    restorer.plan_layout().unwrap();
    let rows = rows_of(&restorer);
    assert_eq!(rows[0].cells[1], OutputCell::Scalar(CellValue::Int32(42)));
    // Shard b lacks "run": zero default, row still emitted.
    assert_eq!(rows[1].cells[0], OutputCell::Scalar(CellValue::Float64(2.0)));
    assert_eq!(rows[1].cells[1], OutputCell::Scalar(CellValue::Int32(0)));
}

#[test]
fn test_kind_conflict_drops_shard_column() {
    let mut restorer = Restorer::new();
    restorer
        .add_shard(
            "a",
            table(vec![f64_list("ys", &[&[1.0, 2.0, 3.0]])]),
        )
        .unwrap();
    // Same field name, different element kind: this shard's column is
    // dropped, its rows contribute defaults.
    restorer
        .add_shard("b", table(vec![i32_list("ys", &[&[1, 2, 3, 4, 5]])]))
        .unwrap();

    let slots = restorer.plan_layout().unwrap().to_vec();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].kind, FieldKind::Float64);
    // Width comes from the first shard only; the conflicting column does not
    // contribute.
    assert_eq!(slots[0].width, Some(3));

    let conflicts = restorer.conflicts();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].shard, "b");
    assert_eq!(conflicts[0].field, "ys");
    assert_eq!(conflicts[0].expected, FieldKind::Float64);
    assert_eq!(conflicts[0].found, FieldKind::Int32);

    let rows = rows_of(&restorer);
    assert_eq!(rows[0].cells[0], OutputCell::Array(f64s(&[1.0, 2.0, 3.0])));
    assert_eq!(rows[1].cells[0], OutputCell::Array(f64s(&[0.0, 0.0, 0.0])));
}

#[test]
fn test_accessors_track_planning_state() {
    let mut restorer = Restorer::new();
    assert_eq!(restorer.shard_count(), 0);
    assert!(restorer.layout().is_none());

    restorer
        .add_shard("a", table(vec![f64_scalar("x", &[1.0, 2.0])]))
        .unwrap();
    restorer
        .add_shard("b", table(vec![f64_scalar("x", &[3.0])]))
        .unwrap();
    assert_eq!(restorer.shard_count(), 2);
    assert_eq!(restorer.total_rows(), 3);
    assert!(restorer.layout().is_none());

    let slots = restorer.plan_layout().unwrap().to_vec();
    assert_eq!(restorer.layout(), Some(&slots[..]));
}

#[test]
fn test_plan_is_idempotent() {
    let mut restorer = Restorer::new();
    restorer
        .add_shard("a", table(vec![f64_scalar("x", &[1.0])]))
        .unwrap();
    let first = restorer.plan_layout().unwrap().to_vec();
    let second = restorer.plan_layout().unwrap().to_vec();
    assert_eq!(first, second);
}
