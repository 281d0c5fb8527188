//! Per-field accumulators for the forward direction.
//!
//! [`ValueBuffer`] multiplexes the eleven Arrow primitive builders behind one
//! tagged enum, so every append and finish dispatches through a single
//! exhaustive match. [`ColumnBuffer`] layers the scalar/list distinction on
//! top: list columns keep their own offsets vector and finish into Arrow's
//! offsets+values list encoding.

use std::sync::Arc;

use arrow::array::{
    ArrayBuilder, ArrayRef, BooleanBuilder, Float32Builder, Float64Builder, Int16Builder, Int32Builder,
    Int64Builder, Int8Builder, ListArray, UInt16Builder, UInt32Builder, UInt64Builder,
    UInt8Builder,
};
use arrow::buffer::{OffsetBuffer, ScalarBuffer};
use arrow::datatypes::Field;
use arrow::error::ArrowError;

use crate::row::CellValue;
use crate::schema::FieldKind;

/// A growing, typed sequence of raw values. One variant per [`FieldKind`].
pub enum ValueBuffer {
    /// Float32 accumulator
    Float32(Float32Builder),
    /// Float64 accumulator
    Float64(Float64Builder),
    /// Int8 accumulator
    Int8(Int8Builder),
    /// UInt8 accumulator
    UInt8(UInt8Builder),
    /// Int16 accumulator
    Int16(Int16Builder),
    /// UInt16 accumulator
    UInt16(UInt16Builder),
    /// Int32 accumulator
    Int32(Int32Builder),
    /// UInt32 accumulator
    UInt32(UInt32Builder),
    /// Int64 accumulator
    Int64(Int64Builder),
    /// UInt64 accumulator
    UInt64(UInt64Builder),
    /// Bool accumulator with validity
    Bool(BooleanBuilder),
}

impl ValueBuffer {
    /// Creates an empty buffer of the given kind.
    pub fn for_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Float32 => ValueBuffer::Float32(Float32Builder::new()),
            FieldKind::Float64 => ValueBuffer::Float64(Float64Builder::new()),
            FieldKind::Int8 => ValueBuffer::Int8(Int8Builder::new()),
            FieldKind::UInt8 => ValueBuffer::UInt8(UInt8Builder::new()),
            FieldKind::Int16 => ValueBuffer::Int16(Int16Builder::new()),
            FieldKind::UInt16 => ValueBuffer::UInt16(UInt16Builder::new()),
            FieldKind::Int32 => ValueBuffer::Int32(Int32Builder::new()),
            FieldKind::UInt32 => ValueBuffer::UInt32(UInt32Builder::new()),
            FieldKind::Int64 => ValueBuffer::Int64(Int64Builder::new()),
            FieldKind::UInt64 => ValueBuffer::UInt64(UInt64Builder::new()),
            FieldKind::Bool => ValueBuffer::Bool(BooleanBuilder::new()),
        }
    }

    /// The kind this buffer accumulates.
    pub fn kind(&self) -> FieldKind {
        match self {
            ValueBuffer::Float32(_) => FieldKind::Float32,
            ValueBuffer::Float64(_) => FieldKind::Float64,
            ValueBuffer::Int8(_) => FieldKind::Int8,
            ValueBuffer::UInt8(_) => FieldKind::UInt8,
            ValueBuffer::Int16(_) => FieldKind::Int16,
            ValueBuffer::UInt16(_) => FieldKind::UInt16,
            ValueBuffer::Int32(_) => FieldKind::Int32,
            ValueBuffer::UInt32(_) => FieldKind::UInt32,
            ValueBuffer::Int64(_) => FieldKind::Int64,
            ValueBuffer::UInt64(_) => FieldKind::UInt64,
            ValueBuffer::Bool(_) => FieldKind::Bool,
        }
    }

    /// Appends one value. On a kind mismatch the value is handed back so the
    /// caller can attach field context to the error.
    pub fn try_append(&mut self, value: CellValue) -> Result<(), CellValue> {
        match (self, value) {
            (ValueBuffer::Float32(b), CellValue::Float32(v)) => b.append_value(v),
            (ValueBuffer::Float64(b), CellValue::Float64(v)) => b.append_value(v),
            (ValueBuffer::Int8(b), CellValue::Int8(v)) => b.append_value(v),
            (ValueBuffer::UInt8(b), CellValue::UInt8(v)) => b.append_value(v),
            (ValueBuffer::Int16(b), CellValue::Int16(v)) => b.append_value(v),
            (ValueBuffer::UInt16(b), CellValue::UInt16(v)) => b.append_value(v),
            (ValueBuffer::Int32(b), CellValue::Int32(v)) => b.append_value(v),
            (ValueBuffer::UInt32(b), CellValue::UInt32(v)) => b.append_value(v),
            (ValueBuffer::Int64(b), CellValue::Int64(v)) => b.append_value(v),
            (ValueBuffer::UInt64(b), CellValue::UInt64(v)) => b.append_value(v),
            (ValueBuffer::Bool(b), CellValue::Bool(v)) => b.append_value(v),
            (_, value) => return Err(value),
        }
        Ok(())
    }

    /// Appends a null entry (Bool validity; harmless for other kinds).
    pub fn append_null(&mut self) {
        match self {
            ValueBuffer::Float32(b) => b.append_null(),
            ValueBuffer::Float64(b) => b.append_null(),
            ValueBuffer::Int8(b) => b.append_null(),
            ValueBuffer::UInt8(b) => b.append_null(),
            ValueBuffer::Int16(b) => b.append_null(),
            ValueBuffer::UInt16(b) => b.append_null(),
            ValueBuffer::Int32(b) => b.append_null(),
            ValueBuffer::UInt32(b) => b.append_null(),
            ValueBuffer::Int64(b) => b.append_null(),
            ValueBuffer::UInt64(b) => b.append_null(),
            ValueBuffer::Bool(b) => b.append_null(),
        }
    }

    /// Number of values appended so far.
    pub fn len(&self) -> usize {
        match self {
            ValueBuffer::Float32(b) => b.len(),
            ValueBuffer::Float64(b) => b.len(),
            ValueBuffer::Int8(b) => b.len(),
            ValueBuffer::UInt8(b) => b.len(),
            ValueBuffer::Int16(b) => b.len(),
            ValueBuffer::UInt16(b) => b.len(),
            ValueBuffer::Int32(b) => b.len(),
            ValueBuffer::UInt32(b) => b.len(),
            ValueBuffer::Int64(b) => b.len(),
            ValueBuffer::UInt64(b) => b.len(),
            ValueBuffer::Bool(b) => b.len(),
        }
    }

    /// True when no values have been appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the accumulated values into an immutable Arrow array.
    pub fn finish(&mut self) -> ArrayRef {
        match self {
            ValueBuffer::Float32(b) => Arc::new(b.finish()),
            ValueBuffer::Float64(b) => Arc::new(b.finish()),
            ValueBuffer::Int8(b) => Arc::new(b.finish()),
            ValueBuffer::UInt8(b) => Arc::new(b.finish()),
            ValueBuffer::Int16(b) => Arc::new(b.finish()),
            ValueBuffer::UInt16(b) => Arc::new(b.finish()),
            ValueBuffer::Int32(b) => Arc::new(b.finish()),
            ValueBuffer::UInt32(b) => Arc::new(b.finish()),
            ValueBuffer::Int64(b) => Arc::new(b.finish()),
            ValueBuffer::UInt64(b) => Arc::new(b.finish()),
            ValueBuffer::Bool(b) => Arc::new(b.finish()),
        }
    }
}

/// Per-field accumulator: flat values for scalars, offsets + values for
/// sequence fields.
pub enum ColumnBuffer {
    /// Scalar column: one value per row.
    Scalar(ValueBuffer),
    /// List column. `offsets` always starts at 0, is non-decreasing, and has
    /// one entry per observed row plus one; row i's elements span
    /// `values[offsets[i]..offsets[i + 1]]`.
    List {
        /// Row boundaries into `values`.
        offsets: Vec<i32>,
        /// Flat element storage.
        values: ValueBuffer,
    },
}

impl ColumnBuffer {
    /// Creates an empty scalar buffer.
    pub fn scalar(kind: FieldKind) -> Self {
        ColumnBuffer::Scalar(ValueBuffer::for_kind(kind))
    }

    /// Creates an empty list buffer.
    pub fn list(kind: FieldKind) -> Self {
        ColumnBuffer::List {
            offsets: vec![0],
            values: ValueBuffer::for_kind(kind),
        }
    }

    /// Freezes into an Arrow array: flat for scalars, `ListArray` for lists.
    pub fn finish(&mut self) -> Result<ArrayRef, ArrowError> {
        match self {
            ColumnBuffer::Scalar(values) => Ok(values.finish()),
            ColumnBuffer::List { offsets, values } => {
                let item = Arc::new(Field::new_list_field(values.kind().arrow_type(), true));
                let offsets =
                    OffsetBuffer::new(ScalarBuffer::from(std::mem::replace(offsets, vec![0])));
                let array = ListArray::try_new(item, offsets, values.finish(), None)?;
                Ok(Arc::new(array))
            }
        }
    }
}
