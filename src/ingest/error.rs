//! Error types for invoice ingestion.

/// Errors returned while turning an uploaded file into an
/// [`InvoiceRecord`](super::InvoiceRecord).
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The file name does not end in a supported suffix.
    #[error("unsupported invoice format: {file_name} (expected .json or .csv)")]
    UnsupportedFormat {
        /// The rejected file name.
        file_name: String,
    },

    /// The file claimed to be JSON but could not be parsed.
    #[error("malformed JSON invoice: {reason}")]
    MalformedJson {
        /// The serde error message.
        reason: String,
    },

    /// The JSON parsed, but the top-level value is not an object.
    #[error("JSON invoice must be an object, found {found}")]
    NotAnObject {
        /// The JSON type that was found instead.
        found: &'static str,
    },

    /// The file has no header row.
    #[error("invoice file is empty")]
    EmptyFile,

    /// A CSV file has a header row but no value row.
    #[error("CSV invoice has a header row but no data row")]
    MissingDataRow,

    /// The file could not be read from disk.
    #[error("failed to read invoice file: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Whether the content was read but could not be understood.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            IngestError::MalformedJson { .. }
                | IngestError::NotAnObject { .. }
                | IngestError::EmptyFile
                | IngestError::MissingDataRow
        )
    }
}
