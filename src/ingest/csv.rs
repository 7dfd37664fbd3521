//! CSV invoice files: a header row and a single value row.
//!
//! Cells are split on `,` and zipped by position; there is no quoting or
//! escaping. One file carries exactly one invoice. Rows after the second
//! are ignored and reported with a warning.

use serde_json::Value;
use tracing::{debug, warn};

use super::{InvoiceRecord, IngestError};

/// Parse a CSV invoice file.
///
/// Every header and value is trimmed; values stay strings. Headers without a
/// matching value map to `""`, surplus values are dropped.
pub fn parse_csv_record(content: &str) -> Result<InvoiceRecord, IngestError> {
    let mut lines = content.lines();

    let header_line = lines
        .next()
        .map(|l| l.trim_start_matches('\u{feff}'))
        .filter(|l| !l.trim().is_empty())
        .ok_or(IngestError::EmptyFile)?;
    let value_line = lines
        .next()
        .filter(|l| !l.trim().is_empty())
        .ok_or(IngestError::MissingDataRow)?;

    let ignored = lines.filter(|l| !l.trim().is_empty()).count();
    if ignored > 0 {
        warn!(
            ignored_rows = ignored,
            "CSV invoice has more than one data row; only the first is used"
        );
    }

    let headers = split_row(header_line);
    let values = split_row(value_line);
    if headers.len() != values.len() {
        debug!(
            headers = headers.len(),
            values = values.len(),
            "CSV header and value rows differ in length"
        );
    }

    let mut record = InvoiceRecord::new();
    for (i, header) in headers.into_iter().enumerate() {
        let value = values.get(i).copied().unwrap_or("");
        record.insert(header, Value::String(value.to_string()));
    }
    Ok(record)
}

fn split_row(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}
