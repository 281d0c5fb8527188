//! # Row→Columnar builder engine
//!
//! [`TableBuilder`] owns one typed accumulator per schema field. Each call to
//! [`TableBuilder::observe`] appends one row: scalar fields append their value
//! directly, sequence fields append one offset advance followed by the row's
//! elements. [`TableBuilder::finalize`] freezes every accumulator into an
//! immutable [`ColumnarTable`]; the builder rejects further use afterwards.
//!
//! Within a row, every scalar field is materialized before any sequence
//! field. Sizing fields therefore always carry their value by the time a
//! dependent variable array is read, regardless of where either appears in
//! declaration order.

mod buffers;
mod error;

#[cfg(test)]
mod tests;

use log::debug;

pub use buffers::{ColumnBuffer, ValueBuffer};
pub use error::BuildError;

use crate::row::RowRecord;
use crate::schema::{FieldDescriptor, FieldKind, FieldShape};
use crate::table::ColumnarTable;

/// Streaming row→columnar converter for one table.
pub struct TableBuilder {
    fields: Vec<FieldDescriptor>,
    buffers: Vec<ColumnBuffer>,
    /// Field indices in observation order: all scalars, then all arrays.
    scalar_order: Vec<usize>,
    array_order: Vec<usize>,
    /// For each array field, the index of its resolved sizing field.
    size_source: Vec<Option<usize>>,
    /// Per-row scratch holding materialized sizing values, indexed by field.
    row_sizes: Vec<Option<usize>>,
    rows: usize,
    finalized: bool,
}

impl TableBuilder {
    /// Creates a builder with one empty accumulator per schema field.
    pub fn new(schema: &[FieldDescriptor]) -> Self {
        let fields: Vec<FieldDescriptor> = schema.to_vec();
        let buffers = fields
            .iter()
            .map(|f| {
                if f.is_array() {
                    ColumnBuffer::list(f.kind)
                } else {
                    ColumnBuffer::scalar(f.kind)
                }
            })
            .collect();

        let scalar_order: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_array())
            .map(|(i, _)| i)
            .collect();
        let array_order: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_array())
            .map(|(i, _)| i)
            .collect();

        // Resolve sizing-field names to scalar integer field indices once.
        // Inspection already warned about unresolved names; anything still
        // unresolved here quietly falls back to observed length.
        let size_source = fields
            .iter()
            .map(|f| match &f.shape {
                FieldShape::VariableArray {
                    size_field: Some(name),
                } => fields.iter().position(|s| {
                    s.name == *name && s.shape == FieldShape::Scalar && s.kind.is_integer()
                }),
                _ => None,
            })
            .collect();

        let row_sizes = vec![None; fields.len()];
        Self {
            fields,
            buffers,
            scalar_order,
            array_order,
            size_source,
            row_sizes,
            rows: 0,
            finalized: false,
        }
    }

    /// Number of rows observed so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The schema this builder accumulates against.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Appends one row across every field accumulator.
    ///
    /// Scalars first (materializing sizing values), then sequence fields: one
    /// offset advance of n, then n element appends. A `FixedArray` row longer
    /// than its declared width is truncated to the width; shorter rows append
    /// only what is present (padding belongs to the reverse direction).
    pub fn observe<R: RowRecord + ?Sized>(&mut self, row: &R) -> Result<(), BuildError> {
        if self.finalized {
            return Err(BuildError::InvalidState);
        }

        self.row_sizes.fill(None);
        for &i in &self.scalar_order {
            let field = &self.fields[i];
            let value = row.scalar(field)?;
            let ColumnBuffer::Scalar(buffer) = &mut self.buffers[i] else {
                unreachable!("scalar_order indexes only scalar buffers");
            };
            match value {
                Some(value) => {
                    self.row_sizes[i] = value.as_length();
                    buffer
                        .try_append(value)
                        .map_err(|found| BuildError::KindMismatch {
                            field: field.name.clone(),
                            expected: field.kind,
                            found: found.kind(),
                        })?;
                }
                None if field.kind == FieldKind::Bool => buffer.append_null(),
                None => {
                    return Err(BuildError::MissingScalar {
                        field: field.name.clone(),
                    })
                }
            }
        }

        for &i in &self.array_order {
            let field = &self.fields[i];
            let elements = row.elements(field)?;
            let count = match &field.shape {
                FieldShape::FixedArray { width } => {
                    if elements.len() > *width {
                        debug!(
                            "field {}: row {} has {} elements, truncating to declared width {}",
                            field.name,
                            self.rows,
                            elements.len(),
                            width
                        );
                    }
                    elements.len().min(*width)
                }
                FieldShape::VariableArray { .. } => match self.size_source[i] {
                    Some(src) => {
                        let declared = self.row_sizes[src].unwrap_or(elements.len());
                        declared.min(elements.len())
                    }
                    None => elements.len(),
                },
                FieldShape::Scalar => unreachable!("array_order indexes only array buffers"),
            };

            let ColumnBuffer::List { offsets, values } = &mut self.buffers[i] else {
                unreachable!("array_order indexes only list buffers");
            };
            let last = *offsets.last().unwrap_or(&0);
            offsets.push(last + count as i32);
            for element in elements.into_iter().take(count) {
                values
                    .try_append(element)
                    .map_err(|found| BuildError::KindMismatch {
                        field: field.name.clone(),
                        expected: field.kind,
                        found: found.kind(),
                    })?;
            }
        }

        self.rows += 1;
        Ok(())
    }

    /// Freezes every accumulator and hands ownership of the resulting arrays
    /// to the caller. Any later `observe` or `finalize` fails with
    /// [`BuildError::InvalidState`].
    pub fn finalize(&mut self) -> Result<ColumnarTable, BuildError> {
        if self.finalized {
            return Err(BuildError::InvalidState);
        }
        self.finalized = true;

        let mut columns = Vec::with_capacity(self.buffers.len());
        for buffer in &mut self.buffers {
            columns.push(buffer.finish()?);
        }
        Ok(ColumnarTable::new(std::mem::take(&mut self.fields), columns)?)
    }
}
