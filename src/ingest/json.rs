//! JSON invoice files: one top-level object, used as-is.

use serde_json::Value;

use super::{InvoiceRecord, IngestError};

/// Parse a JSON invoice file.
///
/// The whole content must be a single JSON object. Anything else fails
/// without a partial result.
pub fn parse_json_record(content: &str) -> Result<InvoiceRecord, IngestError> {
    let value: Value = serde_json::from_str(content).map_err(|e| IngestError::MalformedJson {
        reason: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(InvoiceRecord::from(map)),
        other => Err(IngestError::NotAnObject {
            found: json_type_name(&other),
        }),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
