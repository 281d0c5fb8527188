/// Errors that can occur during columnar→row reconstruction
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    /// Engine method called out of required order
    #[error("reconstruction engine used out of order: {0}")]
    InvalidState(&'static str),

    /// A column's physical layout does not match its declared kind
    #[error("column {field}: unexpected physical layout")]
    ColumnLayout {
        /// Field name of the offending column
        field: String,
    },
}
