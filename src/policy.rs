//! Per-operation failure policy.
//!
//! Reads that only feed passive display degrade to a static empty value
//! ([`FallbackShape`]) so the dashboard renders zeros instead of an error.
//! Operations whose caller has an error path (detail view, PDF download,
//! saving configuration, uploading) propagate the failure.
//!
//! The policy is data: [`POLICY_TABLE`] maps every [`Operation`] to a
//! [`FailurePolicy`], and [`apply`] is the only place it is enforced.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::error::Result;
use crate::ClientError;

/// Every backend capability the client exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Stats,
    ListInvoices,
    GetInvoice,
    GetInvoicePdf,
    Logs,
    GetConfig,
    SetConfig,
    Metrics,
    UploadInvoice,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::Stats,
        Operation::ListInvoices,
        Operation::GetInvoice,
        Operation::GetInvoicePdf,
        Operation::Logs,
        Operation::GetConfig,
        Operation::SetConfig,
        Operation::Metrics,
        Operation::UploadInvoice,
    ];

    /// Stable identifier for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Stats => "get_invoice_stats",
            Operation::ListInvoices => "list_invoices",
            Operation::GetInvoice => "get_invoice",
            Operation::GetInvoicePdf => "get_invoice_pdf",
            Operation::Logs => "get_processing_logs",
            Operation::GetConfig => "get_configuration",
            Operation::SetConfig => "update_configuration",
            Operation::Metrics => "get_metrics",
            Operation::UploadInvoice => "upload_invoice",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Operation::SetConfig => Method::PUT,
            Operation::UploadInvoice => Method::POST,
            _ => Method::GET,
        }
    }

    /// Route, with `{id}` standing for the invoice id.
    pub fn path(&self) -> &'static str {
        match self {
            Operation::Stats => "/invoices/stats",
            Operation::ListInvoices => "/invoices",
            Operation::GetInvoice => "/invoices/{id}",
            Operation::GetInvoicePdf => "/invoices/{id}/pdf",
            Operation::Logs => "/logs",
            Operation::GetConfig | Operation::SetConfig => "/config",
            Operation::Metrics => "/metrics",
            Operation::UploadInvoice => "/invoices/upload",
        }
    }

    /// Look up this operation's entry in [`POLICY_TABLE`].
    pub fn policy(&self) -> FailurePolicy {
        POLICY_TABLE
            .iter()
            .find(|(op, _)| op == self)
            .map(|(_, policy)| *policy)
            .unwrap_or(FailurePolicy::Propagate)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Static "nothing to show" values, one per passive read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackShape {
    /// `{totalInvoices: 0, processedToday: 0, errorRate: 0, averageProcessingTime: 0}`
    ZeroStats,
    /// `{invoices: [], total: 0}`
    EmptyInvoiceList,
    /// `{logs: []}`
    EmptyLogs,
    /// `{}`
    EmptyConfig,
    /// `{processingTime: [], errorRate: [], invoiceCount: []}`
    EmptyMetrics,
}

impl FallbackShape {
    /// The JSON body a successful call would have returned if there were no data.
    pub fn to_value(&self) -> Value {
        match self {
            FallbackShape::ZeroStats => json!({
                "totalInvoices": 0,
                "processedToday": 0,
                "errorRate": 0,
                "averageProcessingTime": 0
            }),
            FallbackShape::EmptyInvoiceList => json!({"invoices": [], "total": 0}),
            FallbackShape::EmptyLogs => json!({"logs": []}),
            FallbackShape::EmptyConfig => json!({}),
            FallbackShape::EmptyMetrics => json!({
                "processingTime": [],
                "errorRate": [],
                "invoiceCount": []
            }),
        }
    }
}

/// What to do when an operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log and return the error to the caller.
    Propagate,
    /// Log and return the given empty value instead.
    FallbackTo(FallbackShape),
}

/// The failure policy of every operation.
pub const POLICY_TABLE: &[(Operation, FailurePolicy)] = &[
    (Operation::Stats, FailurePolicy::FallbackTo(FallbackShape::ZeroStats)),
    (Operation::ListInvoices, FailurePolicy::FallbackTo(FallbackShape::EmptyInvoiceList)),
    (Operation::GetInvoice, FailurePolicy::Propagate),
    (Operation::GetInvoicePdf, FailurePolicy::Propagate),
    (Operation::Logs, FailurePolicy::FallbackTo(FallbackShape::EmptyLogs)),
    (Operation::GetConfig, FailurePolicy::FallbackTo(FallbackShape::EmptyConfig)),
    (Operation::SetConfig, FailurePolicy::Propagate),
    (Operation::Metrics, FailurePolicy::FallbackTo(FallbackShape::EmptyMetrics)),
    (Operation::UploadInvoice, FailurePolicy::Propagate),
];

/// Apply `op`'s failure policy to an outcome.
///
/// Successes pass through. Failures are logged, then either returned or
/// replaced by the operation's fallback shape decoded as `T`.
pub fn apply<T: DeserializeOwned>(op: Operation, outcome: Result<T>) -> Result<T> {
    let err = match outcome {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    match op.policy() {
        FailurePolicy::FallbackTo(shape) => {
            warn!(operation = %op, error = %err, "Request failed; returning empty result");
            serde_json::from_value(shape.to_value()).map_err(ClientError::from)
        }
        FailurePolicy::Propagate => {
            error!(operation = %op, error = %err, "Request failed");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InvoiceList, InvoiceStats, LogsResponse, MetricsSeries, SystemConfig};

    fn transport_failure() -> ClientError {
        ClientError::HttpError {
            status: 500,
            body: "internal error".into(),
        }
    }

    #[test]
    fn test_every_operation_has_one_entry() {
        for op in Operation::ALL {
            let entries = POLICY_TABLE.iter().filter(|(o, _)| *o == op).count();
            assert_eq!(entries, 1, "{op}");
        }
        assert_eq!(POLICY_TABLE.len(), Operation::ALL.len());
    }

    #[test]
    fn test_passive_reads_fall_back() {
        for op in [
            Operation::Stats,
            Operation::ListInvoices,
            Operation::Logs,
            Operation::GetConfig,
            Operation::Metrics,
        ] {
            assert!(matches!(op.policy(), FailurePolicy::FallbackTo(_)), "{op}");
        }
    }

    #[test]
    fn test_error_visible_operations_propagate() {
        for op in [
            Operation::GetInvoice,
            Operation::GetInvoicePdf,
            Operation::SetConfig,
            Operation::UploadInvoice,
        ] {
            assert_eq!(op.policy(), FailurePolicy::Propagate, "{op}");
        }
    }

    #[test]
    fn test_fallback_shapes_match_response_types() {
        let stats: InvoiceStats = apply(Operation::Stats, Err(transport_failure())).unwrap();
        assert_eq!(stats, InvoiceStats::default());

        let list: InvoiceList = apply(Operation::ListInvoices, Err(transport_failure())).unwrap();
        assert!(list.invoices.is_empty());
        assert_eq!(list.total, 0);

        let logs: LogsResponse = apply(Operation::Logs, Err(transport_failure())).unwrap();
        assert!(logs.logs.is_empty());

        let config: SystemConfig = apply(Operation::GetConfig, Err(transport_failure())).unwrap();
        assert!(config.is_empty());

        let metrics: MetricsSeries = apply(Operation::Metrics, Err(transport_failure())).unwrap();
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_propagate_returns_original_error() {
        let result: Result<Value> = apply(Operation::GetInvoice, Err(transport_failure()));
        assert!(matches!(result, Err(ClientError::HttpError { status: 500, .. })));
    }

    #[test]
    fn test_success_passes_through() {
        let stats = InvoiceStats {
            total_invoices: 7,
            ..Default::default()
        };
        let out = apply(Operation::Stats, Ok(stats.clone())).unwrap();
        assert_eq!(out, stats);
    }

    #[test]
    fn test_methods_and_paths() {
        assert_eq!(Operation::SetConfig.method(), Method::PUT);
        assert_eq!(Operation::UploadInvoice.method(), Method::POST);
        assert_eq!(Operation::GetConfig.method(), Method::GET);
        assert_eq!(Operation::GetInvoicePdf.path(), "/invoices/{id}/pdf");
    }
}
