//! Parquet persistence for [`ColumnarTable`]s.
//!
//! One table artifact per file: scalar fields as flat typed buffers, sequence
//! fields as offsets+values list columns, shape metadata in the embedded
//! Arrow schema. Shards of one logical dataset are discovered by the
//! `.parquet` extension and sorted by file name so a merge run is
//! reproducible regardless of directory iteration order.

use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::compute::concat;
use arrow::record_batch::RecordBatch;
use log::{info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;

use crate::schema::FieldDescriptor;
use crate::table::ColumnarTable;

/// File extension identifying columnar table shards.
pub const SHARD_EXTENSION: &str = "parquet";

/// Errors that can occur while persisting or loading columnar tables
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the Arrow library
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from the Parquet library
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// No shard files found at the given path
    #[error("no .{SHARD_EXTENSION} shards found under {0}")]
    NoShards(PathBuf),
}

/// Knobs applied at the storage boundary.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// ZSTD compression level (1-22).
    pub compression_level: i32,
    /// Maximum rows per Parquet row group.
    pub row_group_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            compression_level: 3,
            row_group_size: 1_048_576,
        }
    }
}

impl StoreConfig {
    fn writer_properties(&self) -> Result<WriterProperties, StoreError> {
        Ok(WriterProperties::builder()
            .set_compression(Compression::ZSTD(ZstdLevel::try_new(
                self.compression_level,
            )?))
            .set_max_row_group_size(self.row_group_size)
            .build())
    }
}

/// Writes one finalized table to a Parquet file.
pub fn write_table(
    path: impl AsRef<Path>,
    table: &ColumnarTable,
    config: &StoreConfig,
) -> Result<(), StoreError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let batch = table.to_record_batch()?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(config.writer_properties()?))?;
    writer.write(&batch)?;
    writer.close()?;
    info!(
        "wrote {} rows x {} columns to {}",
        table.num_rows(),
        table.fields().len(),
        path.display()
    );
    Ok(())
}

/// Reads one shard file back into a [`ColumnarTable`].
///
/// Columns whose type falls outside the closed kind set are skipped with a
/// diagnostic; the rest of the shard is still usable.
pub fn read_shard(path: impl AsRef<Path>) -> Result<ColumnarTable, StoreError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let batches = builder.build()?.collect::<Result<Vec<RecordBatch>, _>>()?;

    let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(schema.fields().len());
    let mut columns = Vec::with_capacity(schema.fields().len());
    for (i, field) in schema.fields().iter().enumerate() {
        let Some(descriptor) = FieldDescriptor::from_arrow_field(field) else {
            warn!(
                "{}: column {} has unsupported type {}, skipping",
                path.display(),
                field.name(),
                field.data_type()
            );
            continue;
        };
        let chunks: Vec<_> = batches.iter().map(|b| b.column(i).as_ref()).collect();
        let column = if chunks.is_empty() {
            arrow::array::new_empty_array(field.data_type())
        } else {
            concat(&chunks)?
        };
        fields.push(descriptor);
        columns.push(column);
    }
    Ok(ColumnarTable::new(fields, columns)?)
}

/// Resolves an input path to the ordered list of shard files it denotes.
///
/// A file path denotes itself. A directory yields every `.parquet` entry,
/// sorted by file name for reproducibility.
pub fn discover_shards(path: impl AsRef<Path>) -> Result<Vec<PathBuf>, StoreError> {
    let path = path.as_ref();
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut shards: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry_path.is_file()
            && entry_path
                .extension()
                .is_some_and(|ext| ext == SHARD_EXTENSION)
        {
            shards.push(entry_path);
        }
    }
    shards.sort();
    if shards.is_empty() {
        return Err(StoreError::NoShards(path.to_path_buf()));
    }
    Ok(shards)
}
