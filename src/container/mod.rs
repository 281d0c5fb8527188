//! # JSON event container boundary
//!
//! The row-oriented side of a conversion is a schema-on-read JSON event file:
//! a document holding one or more named containers, each carrying a `schema`
//! array of `{name, type, title}` triples and a `rows` array of per-event
//! objects. The `type` string is a framework type label; the `title` carries
//! the bracketed shape annotation (it defaults to the name when absent, the
//! scalar convention).
//!
//! ```json
//! {
//!   "containers": {
//!     "tree": {
//!       "schema": [
//!         { "name": "nhit", "type": "Int_t" },
//!         { "name": "energy", "type": "Double_t", "title": "energy[nhit]" }
//!       ],
//!       "rows": [
//!         { "nhit": 2, "energy": [511.0, 1274.5] }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! [`JsonRowSource`] feeds the builder engine from such a file;
//! [`JsonRowSink`] persists reconstructed rows back into the same document
//! shape, with array fields carrying fixed-width slots.

mod reader;
mod writer;


use serde::Deserialize;

pub use reader::JsonRowSource;
pub use writer::JsonRowSink;

/// One schema entry of a container, as serialized.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaEntry {
    /// Field name.
    pub name: String,
    /// Framework type label.
    #[serde(rename = "type")]
    pub type_label: String,
    /// Shape annotation; defaults to the field name.
    #[serde(default)]
    pub title: Option<String>,
}

/// One named container of an event file.
#[derive(Debug, Clone, Deserialize)]
pub struct EventContainer {
    /// Raw schema entries in declaration order.
    pub schema: Vec<SchemaEntry>,
    /// One object per event.
    pub rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// A whole event file: named containers.
#[derive(Debug, Clone, Deserialize)]
pub struct EventFile {
    /// Containers by name.
    pub containers: std::collections::BTreeMap<String, EventContainer>,
}
