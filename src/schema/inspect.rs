//! Schema inspection: turning raw (name, type label, annotation) triples into
//! [`FieldDescriptor`]s.
//!
//! Type labels come from the producing framework and map to [`FieldKind`]
//! through a fixed lookup table. Both the ROOT-style spellings (`Double_t`,
//! `UShort_t`, ...) and plain lower-case spellings (`float64`, `uint16`, ...)
//! are accepted. Unrecognized labels are reported and the field is skipped;
//! one bad field never aborts inspection of the rest of the schema.
//!
//! Shape comes from the annotation string: a trailing bracketed token marks an
//! array. An integer token (`samples[16]`) declares a fixed width; any other
//! token (`energy[nhit]`) names a sibling scalar integer field that holds the
//! per-row length.

use log::warn;

use super::{FieldDescriptor, FieldKind, FieldShape};

/// One raw schema entry as found in an input container, before
/// classification.
#[derive(Debug, Clone)]
pub struct RawField {
    /// Field name.
    pub name: String,
    /// Framework type label, e.g. `Double_t` or `uint16`.
    pub type_label: String,
    /// Human-readable annotation; a bracketed suffix declares array shape.
    /// Conventionally equals the name for scalar fields.
    pub annotation: String,
}

impl RawField {
    /// Convenience constructor.
    pub fn new(
        name: impl Into<String>,
        type_label: impl Into<String>,
        annotation: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_label: type_label.into(),
            annotation: annotation.into(),
        }
    }
}

/// Fixed type-label lookup table.
fn kind_for_label(label: &str) -> Option<FieldKind> {
    match label {
        "Float_t" | "float" | "float32" => Some(FieldKind::Float32),
        "Double_t" | "double" | "float64" => Some(FieldKind::Float64),
        "Char_t" | "int8" => Some(FieldKind::Int8),
        "UChar_t" | "uint8" => Some(FieldKind::UInt8),
        "Short_t" | "int16" => Some(FieldKind::Int16),
        "UShort_t" | "uint16" => Some(FieldKind::UInt16),
        "Int_t" | "int" | "int32" => Some(FieldKind::Int32),
        "UInt_t" | "uint32" => Some(FieldKind::UInt32),
        "Long64_t" | "int64" => Some(FieldKind::Int64),
        "ULong64_t" | "uint64" => Some(FieldKind::UInt64),
        "Bool_t" | "bool" => Some(FieldKind::Bool),
        _ => None,
    }
}

enum ParsedShape {
    Scalar,
    Fixed(usize),
    Variable(String),
}

/// Extracts the shape declared by a bracketed annotation suffix.
fn parse_shape(annotation: &str) -> ParsedShape {
    let Some(open) = annotation.find('[') else {
        return ParsedShape::Scalar;
    };
    let Some(close) = annotation[open..].find(']') else {
        return ParsedShape::Scalar;
    };
    let token = annotation[open + 1..open + close].trim();
    if token.is_empty() {
        return ParsedShape::Scalar;
    }
    match token.parse::<usize>() {
        Ok(width) => ParsedShape::Fixed(width),
        Err(_) => ParsedShape::Variable(token.to_string()),
    }
}

/// Classifies a raw row schema into an ordered descriptor list.
///
/// Unrecognized type labels skip the field with a logged diagnostic. A
/// variable array whose declared sizing field does not resolve to a scalar
/// integer field anywhere in the schema (declaration order does not matter)
/// is downgraded to per-row observed length, also with a diagnostic.
pub fn inspect_schema(raw: &[RawField]) -> Vec<FieldDescriptor> {
    let mut fields = Vec::with_capacity(raw.len());
    for entry in raw {
        let Some(kind) = kind_for_label(&entry.type_label) else {
            warn!(
                "field {}: unrecognized type label {:?}, skipping",
                entry.name, entry.type_label
            );
            continue;
        };
        let shape = match parse_shape(&entry.annotation) {
            ParsedShape::Scalar => FieldShape::Scalar,
            ParsedShape::Fixed(width) => FieldShape::FixedArray { width },
            ParsedShape::Variable(size_field) => FieldShape::VariableArray {
                size_field: Some(size_field),
            },
        };
        fields.push(FieldDescriptor {
            name: entry.name.clone(),
            kind,
            shape,
        });
    }

    // Resolve sizing-field names against the full schema. The reference is
    // order-independent; only kind and shape of the target matter.
    let scalars: Vec<(String, FieldKind)> = fields
        .iter()
        .filter(|f| f.shape == FieldShape::Scalar)
        .map(|f| (f.name.clone(), f.kind))
        .collect();
    for field in &mut fields {
        let name = field.name.clone();
        if let FieldShape::VariableArray { size_field } = &mut field.shape {
            if let Some(target) = size_field.clone() {
                let resolved = scalars
                    .iter()
                    .any(|(n, k)| *n == target && k.is_integer());
                if !resolved {
                    warn!(
                        "field {name}: sizing field {target:?} is not a scalar integer \
                         field, falling back to per-row observed length"
                    );
                    *size_field = None;
                }
            }
        }
    }
    fields
}
