//! Row sink persisting reconstructed rows as a JSON event container.
//!
//! The output mirrors the input document shape, so an unpacked file can be
//! fed straight back into the forward direction. Array slots advertise their
//! fixed width through the title annotation (`energy[3]`).

use std::path::PathBuf;

use serde_json::{json, Map, Value};

use crate::row::{CellValue, OutputCell, OutputRow, RowSink, SinkError, SlotField};

/// Buffers reconstructed rows and writes one JSON event container on finish.
pub struct JsonRowSink {
    path: PathBuf,
    container: String,
    slots: Vec<SlotField>,
    rows: Vec<Value>,
    begun: bool,
    finished: bool,
}

impl JsonRowSink {
    /// Creates a sink writing to `path`, under the given container name.
    pub fn new(path: impl Into<PathBuf>, container: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            container: container.into(),
            slots: Vec::new(),
            rows: Vec::new(),
            begun: false,
            finished: false,
        }
    }

    /// Number of rows buffered so far.
    pub fn rows_written(&self) -> usize {
        self.rows.len()
    }

    fn schema_json(&self) -> Vec<Value> {
        self.slots
            .iter()
            .map(|slot| {
                let title = match slot.width {
                    Some(width) => format!("{}[{}]", slot.name, width),
                    None => slot.name.clone(),
                };
                json!({
                    "name": slot.name,
                    "type": slot.kind.label(),
                    "title": title,
                })
            })
            .collect()
    }
}

fn cell_json(value: &CellValue) -> Value {
    match *value {
        CellValue::Float32(v) => json!(v),
        CellValue::Float64(v) => json!(v),
        CellValue::Int8(v) => json!(v),
        CellValue::UInt8(v) => json!(v),
        CellValue::Int16(v) => json!(v),
        CellValue::UInt16(v) => json!(v),
        CellValue::Int32(v) => json!(v),
        CellValue::UInt32(v) => json!(v),
        CellValue::Int64(v) => json!(v),
        CellValue::UInt64(v) => json!(v),
        CellValue::Bool(v) => json!(v),
    }
}

impl RowSink for JsonRowSink {
    fn begin(&mut self, slots: &[SlotField]) -> Result<(), SinkError> {
        if self.begun {
            return Err(SinkError::InvalidState("begin called twice"));
        }
        self.begun = true;
        self.slots = slots.to_vec();
        Ok(())
    }

    fn write_row(&mut self, row: &OutputRow) -> Result<(), SinkError> {
        if !self.begun || self.finished {
            return Err(SinkError::InvalidState("write_row outside begin/finish"));
        }
        let mut object = Map::with_capacity(self.slots.len());
        for (slot, cell) in self.slots.iter().zip(&row.cells) {
            let value = match cell {
                OutputCell::Scalar(value) => cell_json(value),
                OutputCell::Array(values) => Value::Array(values.iter().map(cell_json).collect()),
            };
            object.insert(slot.name.clone(), value);
        }
        self.rows.push(Value::Object(object));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        if !self.begun {
            return Err(SinkError::InvalidState("finish called before begin"));
        }
        if self.finished {
            return Err(SinkError::InvalidState("finish called twice"));
        }
        self.finished = true;
        let mut containers = Map::new();
        containers.insert(
            self.container.clone(),
            json!({
                "schema": self.schema_json(),
                "rows": std::mem::take(&mut self.rows),
            }),
        );
        let document = json!({ "containers": containers });
        let file = std::fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &document)
            .map_err(|e| SinkError::Serialize(e.to_string()))?;
        Ok(())
    }
}
