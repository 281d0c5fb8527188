//! # evtpack - Row-Oriented Event Data in Columnar Parquet
//!
//! `evtpack` converts between row-oriented, schema-on-read scientific event
//! containers (one record per event, with named scalar and sequence fields)
//! and columnar Apache Parquet tables (one contiguous buffer per field,
//! sequence fields in offsets+values list encoding).
//!
//! ## Key Properties
//!
//! - **Schema-driven**: the converter introspects an arbitrary row schema at
//!   run time; nothing about the field set is known at compile time.
//! - **Sequence-aware**: fields may be scalars, fixed-width arrays, or
//!   variable arrays whose per-row length is governed by a sibling sizing
//!   field.
//! - **Shard merging**: the reverse direction merges many columnar shard
//!   files, reconciling their schemas and inferring one fixed output width
//!   per sequence field from the data.
//! - **Interoperable**: output shards are plain Parquet, readable by any
//!   Parquet tool.
//!
//! ## Forward Direction
//!
//! ```rust,no_run
//! use evtpack::builder::TableBuilder;
//! use evtpack::container::JsonRowSource;
//! use evtpack::row::RowSource;
//! use evtpack::store::{write_table, StoreConfig};
//!
//! let mut source = JsonRowSource::open("run0123.json", "tree")?;
//! let mut builder = TableBuilder::new(source.schema());
//! while let Some(row) = source.next_row()? {
//!     builder.observe(&row)?;
//! }
//! let table = builder.finalize()?;
//! write_table("run0123.parquet", &table, &StoreConfig::default())?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Reverse Direction
//!
//! ```rust,no_run
//! use evtpack::container::JsonRowSink;
//! use evtpack::restore::Restorer;
//! use evtpack::row::RowSink;
//! use evtpack::store::{discover_shards, read_shard};
//!
//! let mut restorer = Restorer::new();
//! for shard in discover_shards("shards/")? {
//!     restorer.add_shard(shard.display().to_string(), read_shard(&shard)?)?;
//! }
//! let slots = restorer.plan_layout()?.to_vec();
//! let mut sink = JsonRowSink::new("merged.json", "tree");
//! sink.begin(&slots)?;
//! for row in restorer.emit_rows()? {
//!     sink.write_row(&row?)?;
//! }
//! sink.finish()?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`schema`]: field kinds, shapes, descriptors, and schema inspection
//! - [`row`]: the row-side value model shared by both directions
//! - [`builder`]: the row→columnar builder engine
//! - [`table`]: the immutable in-memory columnar table
//! - [`store`]: Parquet persistence and shard discovery
//! - [`restore`]: the columnar→row reconstruction engine
//! - [`container`]: the JSON event-container row source and sink

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod builder;
pub mod container;
pub mod restore;
pub mod row;
pub mod schema;
pub mod store;
pub mod table;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::builder::{BuildError, TableBuilder};
    pub use crate::container::{JsonRowSink, JsonRowSource};
    pub use crate::restore::{ColumnConflict, RestoreError, Restorer};
    pub use crate::row::{
        CellValue, OutputCell, OutputRow, RowRecord, RowSink, RowSource, SinkError, SlotField,
        SourceError,
    };
    pub use crate::schema::{
        inspect_schema, FieldDescriptor, FieldKind, FieldShape, RawField,
    };
    pub use crate::store::{
        discover_shards, read_shard, write_table, StoreConfig, StoreError, SHARD_EXTENSION,
    };
    pub use crate::table::ColumnarTable;
}
