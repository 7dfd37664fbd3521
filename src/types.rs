use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Dashboard statistics (`GET /invoices/stats`).
///
/// Numbers are read from integers, floats or numeric strings; anything
/// else reads as zero. Keys the client does not model are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceStats {
    #[serde(deserialize_with = "lenient_count")]
    pub total_invoices: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub processed_today: u64,
    /// Fraction or percentage, as reported by the backend.
    #[serde(deserialize_with = "lenient_number")]
    pub error_rate: f64,
    /// Seconds.
    #[serde(deserialize_with = "lenient_number")]
    pub average_processing_time: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A page of invoices (`GET /invoices`).
///
/// Paging keys such as `nextToken` land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceList {
    pub invoices: Vec<Invoice>,
    #[serde(deserialize_with = "lenient_count")]
    pub total: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One stored invoice as the backend reports it.
///
/// Fields the client does not model are kept in `extra` so nothing the
/// backend sent is lost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Invoice {
    #[serde(default, deserialize_with = "lenient_text")]
    pub invoice_id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: String,
    /// The uploaded invoice fields (customer_name, total_amount, currency...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_data: Option<Map<String, Value>>,
    #[serde(
        rename = "PDFLocation",
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub pdf_location: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Invoice {
    /// Whether a rendered PDF can be downloaded for this invoice.
    pub fn has_pdf(&self) -> bool {
        self.status == "VALIDATED" && self.pdf_location.is_some()
    }
}

/// Processing log page (`GET /logs`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogEntry {
    /// ISO-8601 text or epoch milliseconds, exactly as sent.
    pub timestamp: Value,
    #[serde(deserialize_with = "lenient_text")]
    pub level: String,
    #[serde(deserialize_with = "lenient_text")]
    pub message: String,
    #[serde(
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub invoice_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Time series for the dashboard charts (`GET /metrics`).
///
/// Data points are passed through untouched; their shape is whatever the
/// metrics backend emits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsSeries {
    pub processing_time: Vec<Value>,
    pub error_rate: Vec<Value>,
    pub invoice_count: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetricsSeries {
    pub fn is_empty(&self) -> bool {
        self.processing_time.is_empty() && self.error_rate.is_empty() && self.invoice_count.is_empty()
    }
}

/// System configuration (`GET`/`PUT /config`): an open key/value object.
pub type SystemConfig = Map<String, Value>;

/// Backend reply to an invoice upload, passed through as-is.
pub type UploadResult = Value;

/// Everything the dashboard shows, fetched in one round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub stats: InvoiceStats,
    pub metrics: MetricsSeries,
    pub logs: LogsResponse,
}

fn number_of(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(number_of(&Value::deserialize(deserializer)?).unwrap_or_default())
}

// Negative or fractional counts are clamped/truncated.
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    Ok(number_of(&value).map(|n| n.max(0.0) as u64).unwrap_or_default())
}

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(text_of(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn lenient_optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(text_of(Value::deserialize(deserializer)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invoice_wire_names() {
        let invoice: Invoice = serde_json::from_value(json!({
            "InvoiceId": "8f1c2a",
            "Status": "VALIDATED",
            "CreatedAt": "2025-01-10T12:00:00Z",
            "InvoiceData": {"customer_name": "Acme", "total_amount": 100, "currency": "USD"},
            "PDFLocation": "s3://bucket/8f1c2a.pdf",
            "Country": "US"
        }))
        .unwrap();
        assert_eq!(invoice.invoice_id, "8f1c2a");
        assert!(invoice.has_pdf());
        assert_eq!(invoice.extra.get("Country"), Some(&json!("US")));
        assert_eq!(
            invoice.invoice_data.as_ref().and_then(|d| d.get("customer_name")),
            Some(&json!("Acme"))
        );
    }

    #[test]
    fn test_stats_wire_names() {
        let stats: InvoiceStats = serde_json::from_value(json!({
            "totalInvoices": 12,
            "processedToday": 3,
            "errorRate": 0.25,
            "averageProcessingTime": 4.5
        }))
        .unwrap();
        assert_eq!(stats.total_invoices, 12);
        assert_eq!(stats.average_processing_time, 4.5);
        assert!(stats.extra.is_empty());
    }

    #[test]
    fn test_stats_accept_float_and_text_numbers() {
        let stats: InvoiceStats = serde_json::from_value(json!({
            "totalInvoices": 12.0,
            "processedToday": "3",
            "errorRate": "0.25",
            "averageProcessingTime": null,
            "window": "24h"
        }))
        .unwrap();
        assert_eq!(stats.total_invoices, 12);
        assert_eq!(stats.processed_today, 3);
        assert_eq!(stats.error_rate, 0.25);
        assert_eq!(stats.average_processing_time, 0.0);
        assert_eq!(stats.extra.get("window"), Some(&json!("24h")));
    }

    #[test]
    fn test_log_entry_optional_invoice() {
        let logs: LogsResponse = serde_json::from_value(json!({
            "logs": [
                {"timestamp": "t1", "level": "ERROR", "message": "bad currency", "invoiceId": "inv-1"},
                {"timestamp": "t2", "level": "INFO", "message": "batch done"}
            ]
        }))
        .unwrap();
        assert_eq!(logs.logs[0].invoice_id.as_deref(), Some("inv-1"));
        assert_eq!(logs.logs[1].invoice_id, None);
    }

    #[test]
    fn test_log_entry_epoch_timestamp_kept() {
        let logs: LogsResponse = serde_json::from_value(json!({
            "logs": [
                {"timestamp": 1736510400000u64, "level": "INFO", "message": "ok", "invoiceId": 42, "requestId": "r-1"}
            ]
        }))
        .unwrap();
        let entry = &logs.logs[0];
        assert_eq!(entry.timestamp, json!(1736510400000u64));
        assert_eq!(entry.invoice_id.as_deref(), Some("42"));
        assert_eq!(entry.extra.get("requestId"), Some(&json!("r-1")));
    }

    #[test]
    fn test_list_keeps_unmodeled_keys_on_reserialize() {
        let body = json!({
            "invoices": [{"InvoiceId": 7, "Status": "PENDING"}],
            "total": 1.0,
            "nextToken": "abc"
        });
        let list: InvoiceList = serde_json::from_value(body).unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.invoices[0].invoice_id, "7");
        assert_eq!(list.extra.get("nextToken"), Some(&json!("abc")));

        let again = serde_json::to_value(&list).unwrap();
        assert_eq!(again["nextToken"], json!("abc"));
        assert_eq!(again["total"], json!(1));
    }
}
