//! # Row-side value model
//!
//! Both conversion directions touch rows through the types in this module:
//! the forward engine pulls [`CellValue`]s out of a [`RowRecord`] supplied by
//! a [`RowSource`], and the reverse engine pushes [`OutputRow`]s into a
//! [`RowSink`].
//!
//! A row record is transient: it is only valid for the iteration step that
//! produced it, which the `RowSource` GAT encodes in the borrow.

use crate::schema::{FieldDescriptor, FieldKind};

/// One typed value of a row cell. Exactly one variant per [`FieldKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    /// 32-bit float value
    Float32(f32),
    /// 64-bit float value
    Float64(f64),
    /// Signed 8-bit value
    Int8(i8),
    /// Unsigned 8-bit value
    UInt8(u8),
    /// Signed 16-bit value
    Int16(i16),
    /// Unsigned 16-bit value
    UInt16(u16),
    /// Signed 32-bit value
    Int32(i32),
    /// Unsigned 32-bit value
    UInt32(u32),
    /// Signed 64-bit value
    Int64(i64),
    /// Unsigned 64-bit value
    UInt64(u64),
    /// Boolean value
    Bool(bool),
}

impl CellValue {
    /// The kind this value belongs to.
    pub fn kind(&self) -> FieldKind {
        match self {
            CellValue::Float32(_) => FieldKind::Float32,
            CellValue::Float64(_) => FieldKind::Float64,
            CellValue::Int8(_) => FieldKind::Int8,
            CellValue::UInt8(_) => FieldKind::UInt8,
            CellValue::Int16(_) => FieldKind::Int16,
            CellValue::UInt16(_) => FieldKind::UInt16,
            CellValue::Int32(_) => FieldKind::Int32,
            CellValue::UInt32(_) => FieldKind::UInt32,
            CellValue::Int64(_) => FieldKind::Int64,
            CellValue::UInt64(_) => FieldKind::UInt64,
            CellValue::Bool(_) => FieldKind::Bool,
        }
    }

    /// The zero/false default used when a shard lacks a field or a slot needs
    /// padding.
    pub fn default_for(kind: FieldKind) -> CellValue {
        match kind {
            FieldKind::Float32 => CellValue::Float32(0.0),
            FieldKind::Float64 => CellValue::Float64(0.0),
            FieldKind::Int8 => CellValue::Int8(0),
            FieldKind::UInt8 => CellValue::UInt8(0),
            FieldKind::Int16 => CellValue::Int16(0),
            FieldKind::UInt16 => CellValue::UInt16(0),
            FieldKind::Int32 => CellValue::Int32(0),
            FieldKind::UInt32 => CellValue::UInt32(0),
            FieldKind::Int64 => CellValue::Int64(0),
            FieldKind::UInt64 => CellValue::UInt64(0),
            FieldKind::Bool => CellValue::Bool(false),
        }
    }

    /// Non-negative integer view, used to read sizing-field values.
    pub fn as_length(&self) -> Option<usize> {
        match *self {
            CellValue::Int8(v) => usize::try_from(v).ok(),
            CellValue::UInt8(v) => Some(v as usize),
            CellValue::Int16(v) => usize::try_from(v).ok(),
            CellValue::UInt16(v) => Some(v as usize),
            CellValue::Int32(v) => usize::try_from(v).ok(),
            CellValue::UInt32(v) => Some(v as usize),
            CellValue::Int64(v) => usize::try_from(v).ok(),
            CellValue::UInt64(v) => usize::try_from(v).ok(),
            _ => None,
        }
    }
}

/// Errors surfaced by a row source. Fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O failure on the underlying container
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container is structurally broken
    #[error("malformed input: {0}")]
    Malformed(String),

    /// A row value does not match the schema's declared kind
    #[error("field {field}: expected {expected} value, got {found}")]
    TypeMismatch {
        /// Field name
        field: String,
        /// Kind declared by the schema
        expected: FieldKind,
        /// Description of what the row actually held
        found: String,
    },
}

/// Errors surfaced by a row sink. Fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// I/O failure while persisting rows
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failure
    #[error("serialization error: {0}")]
    Serialize(String),

    /// Sink method called out of order
    #[error("row sink used out of order: {0}")]
    InvalidState(&'static str),
}

/// Typed access to one input row. Valid only for the iteration step that
/// produced it.
pub trait RowRecord {
    /// The scalar value of `field` for this row. `Ok(None)` means the value
    /// is absent/null (meaningful for `Bool` fields, which carry validity).
    fn scalar(&self, field: &FieldDescriptor) -> Result<Option<CellValue>, SourceError>;

    /// The sequence elements of `field` for this row, in source order. An
    /// absent array field reads as empty.
    fn elements(&self, field: &FieldDescriptor) -> Result<Vec<CellValue>, SourceError>;
}

/// An ordered producer of rows plus the schema they conform to.
pub trait RowSource {
    /// Row type lent out per iteration step.
    type Row<'a>: RowRecord
    where
        Self: 'a;

    /// The inspected schema all rows conform to.
    fn schema(&self) -> &[FieldDescriptor];

    /// The next row, or `None` at end of input.
    fn next_row(&mut self) -> Result<Option<Self::Row<'_>>, SourceError>;
}

/// One field slot of the reconstructed row schema.
///
/// Array slots have a fixed `width`; every emitted row fills exactly `width`
/// elements (truncated or zero-padded as needed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotField {
    /// Field name.
    pub name: String,
    /// Primitive kind.
    pub kind: FieldKind,
    /// `Some(width)` for array slots, `None` for scalars. Always >= 1.
    pub width: Option<usize>,
}

/// One reconstructed cell: a scalar value or a fixed-width slot of elements.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCell {
    /// Scalar value.
    Scalar(CellValue),
    /// Fixed-width array slot, length equal to the slot's planned width.
    Array(Vec<CellValue>),
}

/// One reconstructed row, cells in slot order.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    /// Cells, one per [`SlotField`] of the planned layout.
    pub cells: Vec<OutputCell>,
}

/// Consumer of reconstructed rows.
///
/// `begin` is called exactly once with the planned slot layout before any
/// row; `finish` persists the result.
pub trait RowSink {
    /// Accept the output schema. Called once, first.
    fn begin(&mut self, slots: &[SlotField]) -> Result<(), SinkError>;

    /// Accept one row in emission order.
    fn write_row(&mut self, row: &OutputRow) -> Result<(), SinkError>;

    /// Flush and persist.
    fn finish(&mut self) -> Result<(), SinkError>;
}
