use crate::row::SourceError;
use crate::schema::FieldKind;

/// Errors that can occur while building a columnar table from rows
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Engine method called after finalization
    #[error("builder already finalized")]
    InvalidState,

    /// Fatal failure reading from the row source
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// A row handed the engine a value of the wrong kind
    #[error("field {field}: expected {expected} value, got {found}")]
    KindMismatch {
        /// Field name
        field: String,
        /// Kind declared by the schema
        expected: FieldKind,
        /// Kind the row actually produced
        found: FieldKind,
    },

    /// A non-Bool scalar field was absent from a row
    #[error("field {field}: scalar value missing from row")]
    MissingScalar {
        /// Field name
        field: String,
    },

    /// Error from the Arrow library during array construction
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}
