//! In-memory columnar table: ordered (descriptor, array) pairs plus a row
//! count. Immutable once constructed; produced by the builder engine's
//! finalize step or by reading a shard back from disk.

use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::Schema;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::schema::FieldDescriptor;

/// A finalized columnar table.
#[derive(Debug, Clone)]
pub struct ColumnarTable {
    fields: Vec<FieldDescriptor>,
    columns: Vec<ArrayRef>,
    num_rows: usize,
}

impl ColumnarTable {
    /// Builds a table from parallel descriptor/column vectors.
    ///
    /// All columns must share one length; that length is the row count.
    pub fn new(
        fields: Vec<FieldDescriptor>,
        columns: Vec<ArrayRef>,
    ) -> Result<Self, ArrowError> {
        if fields.len() != columns.len() {
            return Err(ArrowError::InvalidArgumentError(format!(
                "{} field descriptors but {} columns",
                fields.len(),
                columns.len()
            )));
        }
        let num_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        for (field, column) in fields.iter().zip(&columns) {
            if column.len() != num_rows {
                return Err(ArrowError::InvalidArgumentError(format!(
                    "column {} has {} rows, expected {}",
                    field.name,
                    column.len(),
                    num_rows
                )));
            }
        }
        Ok(Self {
            fields,
            columns,
            num_rows,
        })
    }

    /// Field descriptors in column order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Column data in field order.
    pub fn columns(&self) -> &[ArrayRef] {
        &self.columns
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Looks a column up by field name.
    pub fn column_by_name(&self, name: &str) -> Option<(&FieldDescriptor, &ArrayRef)> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .map(|i| (&self.fields[i], &self.columns[i]))
    }

    /// The Arrow schema of this table, shape metadata included.
    pub fn arrow_schema(&self) -> Arc<Schema> {
        Arc::new(Schema::new(
            self.fields
                .iter()
                .map(|f| f.to_arrow_field())
                .collect::<Vec<_>>(),
        ))
    }

    /// Converts the whole table into one record batch for writing.
    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        RecordBatch::try_new(self.arrow_schema(), self.columns.clone())
    }
}
