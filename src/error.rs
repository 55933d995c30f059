use std::path::PathBuf;

/// Errors that can abort the conversion of one export file
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The input file is missing, unreadable, or not well-formed XML
    #[error("cannot read source {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    /// A structural element the vendor format requires was absent
    #[error("missing required element: {element}")]
    SchemaMismatch { element: String },

    /// The destination table could not be created or appended to
    #[error("cannot write table {path}: {source}")]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The vendor does not produce exports of the requested kind
    #[error("{vendor} does not provide {kind} exports")]
    UnsupportedConversion { vendor: String, kind: String },
}

impl ConvertError {
    pub(crate) fn schema_mismatch(element: impl Into<String>) -> Self {
        ConvertError::SchemaMismatch {
            element: element.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
