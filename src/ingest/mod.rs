//! # Invoice Ingestion
//!
//! Turns a user-supplied invoice file into an [`InvoiceRecord`] that the
//! client uploads as a JSON body. The raw file bytes never reach the
//! backend, only the parsed fields.
//!
//! Dispatch is purely by file-name suffix and happens once, at the boundary:
//!
//! | Suffix | Format | Parser |
//! |--------|--------|--------|
//! | `.json` | [`SourceFormat::Json`] | [`parse_json_record`] |
//! | `.csv` | [`SourceFormat::Csv`] | [`parse_csv_record`] |
//!
//! Anything else is rejected with [`IngestError::UnsupportedFormat`] before
//! the content is looked at. No semantic validation happens here; currency
//! codes, amounts and required fields are the backend's business.

pub mod csv;
pub mod error;
pub mod json;

pub use csv::parse_csv_record;
pub use error::IngestError;
pub use json::parse_json_record;

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One invoice as a field-name to value mapping.
///
/// Serializes transparently as a JSON object, so it can be sent as-is as
/// the upload body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceRecord(Map<String, Value>);

impl InvoiceRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field, returning the previous value if any.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(field, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for InvoiceRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// The two source encodings an invoice file may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// A single JSON object.
    Json,
    /// A header row followed by one value row.
    Csv,
}

impl SourceFormat {
    /// Resolve the format from a file name's suffix (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Result<Self, IngestError> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".json") {
            Ok(SourceFormat::Json)
        } else if lower.ends_with(".csv") {
            Ok(SourceFormat::Csv)
        } else {
            Err(IngestError::UnsupportedFormat {
                file_name: file_name.to_string(),
            })
        }
    }

    /// Stable identifier, used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Json => "json",
            SourceFormat::Csv => "csv",
        }
    }
}

/// A parse strategy: file text in, record out.
pub type ParseStrategy = fn(&str) -> Result<InvoiceRecord, IngestError>;

/// Select the parser for a format.
pub fn strategy_for(format: SourceFormat) -> ParseStrategy {
    match format {
        SourceFormat::Json => parse_json_record,
        SourceFormat::Csv => parse_csv_record,
    }
}

/// File content tagged with its resolved format.
#[derive(Debug, Clone, Copy)]
pub struct SourceFile<'a> {
    pub format: SourceFormat,
    pub content: &'a str,
}

impl<'a> SourceFile<'a> {
    /// Tag `content` by the suffix of `file_name`.
    pub fn new(file_name: &str, content: &'a str) -> Result<Self, IngestError> {
        let format = SourceFormat::from_file_name(file_name)?;
        Ok(Self { format, content })
    }

    /// Run the format's parser over the content.
    pub fn parse(&self) -> Result<InvoiceRecord, IngestError> {
        strategy_for(self.format)(self.content)
    }
}

/// Parse already-read file text into an [`InvoiceRecord`].
///
/// # Examples
///
/// ```
/// use invoice_client::ingest::parse;
///
/// let record = parse("invoice.csv", "customer_name,total_amount\nAcme, 100").unwrap();
/// assert_eq!(record.get("total_amount"), Some(&serde_json::json!("100")));
///
/// assert!(parse("notes.txt", "anything").is_err());
/// ```
pub fn parse(file_name: &str, content: &str) -> Result<InvoiceRecord, IngestError> {
    SourceFile::new(file_name, content)?.parse()
}

/// Read an invoice file from disk and parse it.
///
/// The suffix is checked first; unsupported files are rejected without
/// being opened.
pub async fn read_invoice_file(path: impl AsRef<Path>) -> Result<InvoiceRecord, IngestError> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let format = SourceFormat::from_file_name(&file_name)?;
    let content = tokio::fs::read_to_string(path).await?;
    strategy_for(format)(&content)
}
