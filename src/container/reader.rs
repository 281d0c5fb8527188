//! Row source backed by a JSON event container.

use std::path::Path;

use serde_json::{Map, Value};

use crate::row::{CellValue, RowRecord, RowSource, SourceError};
use crate::schema::{inspect_schema, FieldDescriptor, FieldKind, RawField};

use super::EventFile;

/// Reads one named container of an event file and lends its rows out one at
/// a time.
pub struct JsonRowSource {
    fields: Vec<FieldDescriptor>,
    rows: std::vec::IntoIter<Map<String, Value>>,
    current: Option<Map<String, Value>>,
}

impl JsonRowSource {
    /// Opens `path` and selects the container named `container`.
    pub fn open(path: impl AsRef<Path>, container: &str) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let parsed: EventFile = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| SourceError::Malformed(format!("{}: {e}", path.display())))?;
        Self::from_file(parsed, container)
    }

    /// Selects a container out of an already-parsed event file.
    pub fn from_file(file: EventFile, container: &str) -> Result<Self, SourceError> {
        let container_data = file.containers.get(container).ok_or_else(|| {
            let known: Vec<&str> = file.containers.keys().map(String::as_str).collect();
            SourceError::Malformed(format!(
                "no container named {container:?} (found: {})",
                known.join(", ")
            ))
        })?;

        let raw: Vec<RawField> = container_data
            .schema
            .iter()
            .map(|e| {
                RawField::new(
                    e.name.clone(),
                    e.type_label.clone(),
                    e.title.clone().unwrap_or_else(|| e.name.clone()),
                )
            })
            .collect();
        let fields = inspect_schema(&raw);

        Ok(Self {
            fields,
            rows: container_data.rows.clone().into_iter(),
            current: None,
        })
    }

    /// Restricts the schema to the named fields, keeping any sizing field a
    /// selected variable array depends on.
    pub fn select_fields(&mut self, names: &[String]) {
        let mut keep: Vec<bool> = self
            .fields
            .iter()
            .map(|f| names.iter().any(|n| *n == f.name))
            .collect();
        for (i, field) in self.fields.iter().enumerate() {
            if !keep[i] {
                continue;
            }
            if let crate::schema::FieldShape::VariableArray {
                size_field: Some(size_field),
            } = &field.shape
            {
                if let Some(j) = self.fields.iter().position(|f| f.name == *size_field) {
                    keep[j] = true;
                }
            }
        }
        let mut index = 0;
        self.fields.retain(|_| {
            let kept = keep[index];
            index += 1;
            kept
        });
    }
}

impl RowSource for JsonRowSource {
    type Row<'a> = JsonRow<'a>;

    fn schema(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    fn next_row(&mut self) -> Result<Option<Self::Row<'_>>, SourceError> {
        self.current = self.rows.next();
        Ok(self.current.as_ref().map(JsonRow))
    }
}

/// One event object, valid for a single iteration step.
pub struct JsonRow<'a>(&'a Map<String, Value>);

impl RowRecord for JsonRow<'_> {
    fn scalar(&self, field: &FieldDescriptor) -> Result<Option<CellValue>, SourceError> {
        match self.0.get(&field.name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => convert(value, field).map(Some),
        }
    }

    fn elements(&self, field: &FieldDescriptor) -> Result<Vec<CellValue>, SourceError> {
        match self.0.get(&field.name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| convert(item, field))
                .collect(),
            Some(other) => Err(mismatch(field, other)),
        }
    }
}

fn mismatch(field: &FieldDescriptor, value: &Value) -> SourceError {
    SourceError::TypeMismatch {
        field: field.name.clone(),
        expected: field.kind,
        found: describe(value),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Number(n) => format!("number {n}"),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

/// Converts one JSON value to the field's declared kind, range-checked.
fn convert(value: &Value, field: &FieldDescriptor) -> Result<CellValue, SourceError> {
    macro_rules! int {
        ($variant:ident, $ty:ty) => {
            value
                .as_i64()
                .and_then(|v| <$ty>::try_from(v).ok())
                .map(CellValue::$variant)
        };
    }
    let converted = match field.kind {
        FieldKind::Float32 => value.as_f64().map(|v| CellValue::Float32(v as f32)),
        FieldKind::Float64 => value.as_f64().map(CellValue::Float64),
        FieldKind::Int8 => int!(Int8, i8),
        FieldKind::UInt8 => int!(UInt8, u8),
        FieldKind::Int16 => int!(Int16, i16),
        FieldKind::UInt16 => int!(UInt16, u16),
        FieldKind::Int32 => int!(Int32, i32),
        FieldKind::UInt32 => int!(UInt32, u32),
        FieldKind::Int64 => value.as_i64().map(CellValue::Int64),
        FieldKind::UInt64 => value.as_u64().map(CellValue::UInt64),
        FieldKind::Bool => value.as_bool().map(CellValue::Bool),
    };
    converted.ok_or_else(|| mismatch(field, value))
}
