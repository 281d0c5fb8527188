//! # Field schema model
//!
//! The row side of a conversion is schema-on-read: every event carries named,
//! independently typed fields, some of which are fixed- or variable-length
//! sequences. This module defines the closed set of primitive storage kinds
//! ([`FieldKind`]), the scalar/array distinction ([`FieldShape`]), and the
//! immutable per-field descriptor ([`FieldDescriptor`]) that every other
//! component dispatches on.
//!
//! Shape metadata is parsed out of human-readable annotations exactly once, at
//! the schema-inspection boundary (see [`inspect_schema`]); downstream
//! components only ever see the tagged variants.
//!
//! Descriptors survive the Parquet boundary through Arrow field metadata: the
//! sizing-field name and the declared slot width are annotated on the Arrow
//! `Field` and recovered when a shard is read back.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field};

mod inspect;


pub use inspect::{inspect_schema, RawField};

/// Arrow field metadata key carrying a variable array's sizing-field name.
pub const SIZED_BY_KEY: &str = "evtpack:sized_by";

/// Arrow field metadata key carrying a fixed array's declared width.
pub const SLOT_WIDTH_KEY: &str = "evtpack:slot_width";

/// The closed set of primitive storage kinds.
///
/// Adding a kind requires extending every dispatch site; the compiler's
/// exhaustiveness check enumerates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// 32-bit IEEE float
    Float32,
    /// 64-bit IEEE float
    Float64,
    /// Signed 8-bit integer
    Int8,
    /// Unsigned 8-bit integer
    UInt8,
    /// Signed 16-bit integer
    Int16,
    /// Unsigned 16-bit integer
    UInt16,
    /// Signed 32-bit integer
    Int32,
    /// Unsigned 32-bit integer
    UInt32,
    /// Signed 64-bit integer
    Int64,
    /// Unsigned 64-bit integer
    UInt64,
    /// Boolean with per-row validity
    Bool,
}

impl FieldKind {
    /// The Arrow data type this kind is stored as.
    pub fn arrow_type(&self) -> DataType {
        match self {
            FieldKind::Float32 => DataType::Float32,
            FieldKind::Float64 => DataType::Float64,
            FieldKind::Int8 => DataType::Int8,
            FieldKind::UInt8 => DataType::UInt8,
            FieldKind::Int16 => DataType::Int16,
            FieldKind::UInt16 => DataType::UInt16,
            FieldKind::Int32 => DataType::Int32,
            FieldKind::UInt32 => DataType::UInt32,
            FieldKind::Int64 => DataType::Int64,
            FieldKind::UInt64 => DataType::UInt64,
            FieldKind::Bool => DataType::Boolean,
        }
    }

    /// Maps an Arrow primitive type back to a kind. `None` for types outside
    /// the closed set.
    pub fn from_arrow(data_type: &DataType) -> Option<FieldKind> {
        match data_type {
            DataType::Float32 => Some(FieldKind::Float32),
            DataType::Float64 => Some(FieldKind::Float64),
            DataType::Int8 => Some(FieldKind::Int8),
            DataType::UInt8 => Some(FieldKind::UInt8),
            DataType::Int16 => Some(FieldKind::Int16),
            DataType::UInt16 => Some(FieldKind::UInt16),
            DataType::Int32 => Some(FieldKind::Int32),
            DataType::UInt32 => Some(FieldKind::UInt32),
            DataType::Int64 => Some(FieldKind::Int64),
            DataType::UInt64 => Some(FieldKind::UInt64),
            DataType::Boolean => Some(FieldKind::Bool),
            _ => None,
        }
    }

    /// True for the integer kinds eligible to act as sizing fields.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            FieldKind::Int8
                | FieldKind::UInt8
                | FieldKind::Int16
                | FieldKind::UInt16
                | FieldKind::Int32
                | FieldKind::UInt32
                | FieldKind::Int64
                | FieldKind::UInt64
        )
    }

    /// Canonical lower-case label, used in emitted schemas and diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Float32 => "float32",
            FieldKind::Float64 => "float64",
            FieldKind::Int8 => "int8",
            FieldKind::UInt8 => "uint8",
            FieldKind::Int16 => "int16",
            FieldKind::UInt16 => "uint16",
            FieldKind::Int32 => "int32",
            FieldKind::UInt32 => "uint32",
            FieldKind::Int64 => "int64",
            FieldKind::UInt64 => "uint64",
            FieldKind::Bool => "bool",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a field holds one value per row or a sequence per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
    /// One value per row.
    Scalar,
    /// A sequence with a declared per-row element capacity.
    FixedArray {
        /// Declared number of valid elements per row.
        width: usize,
    },
    /// A sequence whose per-row length is governed by a sibling scalar
    /// integer field. `size_field` is `None` when the declared sizing field
    /// did not resolve during inspection; the observed per-row length is used
    /// instead.
    VariableArray {
        /// Name of the sibling scalar integer field holding the length.
        size_field: Option<String>,
    },
}

impl FieldShape {
    /// True for both array variants.
    pub fn is_array(&self) -> bool {
        !matches!(self, FieldShape::Scalar)
    }
}

/// One field of a row schema: name, primitive kind, and shape.
///
/// Descriptors are created once by schema inspection (or recovered from a
/// shard's Arrow schema) and are immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name, unique within a schema.
    pub name: String,
    /// Primitive storage kind.
    pub kind: FieldKind,
    /// Scalar or array shape.
    pub shape: FieldShape,
}

impl FieldDescriptor {
    /// Convenience constructor for a scalar field.
    pub fn scalar(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            shape: FieldShape::Scalar,
        }
    }

    /// True for both array shapes.
    pub fn is_array(&self) -> bool {
        self.shape.is_array()
    }

    /// The Arrow field this descriptor maps to.
    ///
    /// Array fields become `List` columns (offsets + values encoding); shape
    /// metadata that Arrow cannot express natively travels in field metadata.
    /// Bool scalars are nullable because they carry per-row validity.
    pub fn to_arrow_field(&self) -> Field {
        match &self.shape {
            FieldShape::Scalar => {
                let nullable = self.kind == FieldKind::Bool;
                Field::new(&self.name, self.kind.arrow_type(), nullable)
            }
            FieldShape::FixedArray { width } => {
                let mut metadata = HashMap::new();
                metadata.insert(SLOT_WIDTH_KEY.to_string(), width.to_string());
                self.list_field().with_metadata(metadata)
            }
            FieldShape::VariableArray { size_field } => {
                let mut metadata = HashMap::new();
                if let Some(size_field) = size_field {
                    metadata.insert(SIZED_BY_KEY.to_string(), size_field.clone());
                }
                self.list_field().with_metadata(metadata)
            }
        }
    }

    fn list_field(&self) -> Field {
        Field::new(
            &self.name,
            DataType::List(Arc::new(Field::new_list_field(
                self.kind.arrow_type(),
                true,
            ))),
            false,
        )
    }

    /// Recovers a descriptor from an Arrow field read back out of a shard.
    ///
    /// Returns `None` for columns whose type falls outside the closed kind
    /// set; callers skip those with a diagnostic.
    pub fn from_arrow_field(field: &Field) -> Option<FieldDescriptor> {
        match field.data_type() {
            DataType::List(item) => {
                let kind = FieldKind::from_arrow(item.data_type())?;
                let metadata = field.metadata();
                let shape = if let Some(width) = metadata.get(SLOT_WIDTH_KEY) {
                    FieldShape::FixedArray {
                        width: width.parse().ok()?,
                    }
                } else {
                    FieldShape::VariableArray {
                        size_field: metadata.get(SIZED_BY_KEY).cloned(),
                    }
                };
                Some(FieldDescriptor {
                    name: field.name().clone(),
                    kind,
                    shape,
                })
            }
            other => Some(FieldDescriptor {
                name: field.name().clone(),
                kind: FieldKind::from_arrow(other)?,
                shape: FieldShape::Scalar,
            }),
        }
    }
}
