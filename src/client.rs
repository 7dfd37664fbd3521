//! The request dispatcher.
//!
//! [`InvoiceClient`] exposes one method per backend capability. Every call
//! fetches fresh auth headers, builds the URL (only supplied query keys),
//! sends through the configured [`Transport`], and runs the outcome through
//! the operation's [`FailurePolicy`](crate::policy::FailurePolicy).

use std::path::Path;
use std::sync::Arc;

use futures::future::join3;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::auth::{AuthProvider, NoSession, SessionProvider};
use crate::config::{ClientConfig, ConfigSources};
use crate::error::Result;
use crate::ingest::{self, InvoiceRecord};
use crate::policy::{self, Operation};
use crate::query::{InvoiceQuery, LogQuery};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
use crate::types::{
    DashboardSnapshot, Invoice, InvoiceList, InvoiceStats, LogsResponse, MetricsSeries,
    SystemConfig, UploadResult,
};
use crate::ClientError;

/// Number of log lines the dashboard shows.
pub const DASHBOARD_LOG_LIMIT: u32 = 10;

/// Authenticated client for the invoice backend.
///
/// Cheap to share: the only state is the resolved [`ClientConfig`] plus
/// `Arc`ed collaborators, so wrap it in an `Arc` and call it from as many
/// tasks as needed.
///
/// Passive reads (stats, invoice list, logs, configuration, metrics) return
/// `Ok` with an empty value when the backend cannot be reached. Detail
/// reads and writes return the error.
///
/// # Example
///
/// ```no_run
/// use invoice_client::{InvoiceClient, InvoiceQuery, StaticSession};
/// use invoice_client::config::ConfigSources;
/// use std::sync::Arc;
///
/// # async fn run() -> invoice_client::Result<()> {
/// let client = InvoiceClient::builder()
///     .config_sources(ConfigSources::new().env_override("https://api.example.com/dev"))
///     .session_provider(Arc::new(StaticSession::new("token")))
///     .build();
///
/// let page = client.list_invoices(&InvoiceQuery::new().status("ERROR")).await?;
/// println!("{} failed invoices", page.total);
/// # Ok(())
/// # }
/// ```
pub struct InvoiceClient {
    config: ClientConfig,
    auth: AuthProvider,
    transport: Arc<dyn Transport>,
}

impl InvoiceClient {
    /// Create a new builder.
    pub fn builder() -> InvoiceClientBuilder {
        InvoiceClientBuilder::default()
    }

    /// Assemble a client from already-built parts.
    pub fn new(
        config: ClientConfig,
        sessions: Arc<dyn SessionProvider>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            auth: AuthProvider::new(sessions),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_address(&self) -> &str {
        self.config.base_address()
    }

    /// `GET /invoices/stats`. Falls back to all-zero stats.
    #[instrument(skip(self))]
    pub async fn get_invoice_stats(&self) -> Result<InvoiceStats> {
        self.call(Operation::Stats, &["invoices", "stats"], &[], None)
            .await
    }

    /// `GET /invoices`. Falls back to an empty page.
    #[instrument(skip(self))]
    pub async fn list_invoices(&self, query: &InvoiceQuery) -> Result<InvoiceList> {
        self.call(Operation::ListInvoices, &["invoices"], &query.to_pairs(), None)
            .await
    }

    /// `GET /invoices/{id}`. Errors are returned.
    #[instrument(skip(self))]
    pub async fn get_invoice(&self, invoice_id: &str) -> Result<Invoice> {
        self.call(Operation::GetInvoice, &["invoices", invoice_id], &[], None)
            .await
    }

    /// `GET /invoices/{id}/pdf`. The body is returned as-is, without
    /// checking that it is a PDF. Errors are returned.
    #[instrument(skip(self))]
    pub async fn get_invoice_pdf(&self, invoice_id: &str) -> Result<Vec<u8>> {
        let op = Operation::GetInvoicePdf;
        let outcome = match self.endpoint(&["invoices", invoice_id, "pdf"], &[]) {
            Ok(url) => self.execute(op, url, None).await.map(|r| r.body),
            Err(e) => Err(e),
        };
        policy::apply(op, outcome)
    }

    /// `GET /logs`. Falls back to no log lines.
    #[instrument(skip(self))]
    pub async fn get_processing_logs(&self, query: &LogQuery) -> Result<LogsResponse> {
        self.call(Operation::Logs, &["logs"], &query.to_pairs(), None)
            .await
    }

    /// `GET /config`. Falls back to an empty object.
    #[instrument(skip(self))]
    pub async fn get_configuration(&self) -> Result<SystemConfig> {
        self.call(Operation::GetConfig, &["config"], &[], None).await
    }

    /// `PUT /config`. Returns the stored configuration; when the backend
    /// replies with an empty body, the submitted configuration is returned.
    /// Errors are returned.
    #[instrument(skip(self, config), fields(keys = config.len()))]
    pub async fn update_configuration(&self, config: &SystemConfig) -> Result<SystemConfig> {
        let op = Operation::SetConfig;
        let outcome = async {
            let url = self.endpoint(&["config"], &[])?;
            let response = self
                .execute(op, url, Some(Value::Object(config.clone())))
                .await?;
            if response.body.iter().all(u8::is_ascii_whitespace) {
                return Ok(config.clone());
            }
            response.json()
        }
        .await;
        policy::apply(op, outcome)
    }

    /// `GET /metrics`. Falls back to three empty series.
    #[instrument(skip(self))]
    pub async fn get_metrics(&self) -> Result<MetricsSeries> {
        self.call(Operation::Metrics, &["metrics"], &[], None).await
    }

    /// `POST /invoices/upload` with the record as the JSON body.
    /// Errors are returned.
    #[instrument(skip(self, record), fields(fields = record.len()))]
    pub async fn upload_invoice(&self, record: &InvoiceRecord) -> Result<UploadResult> {
        self.send_json(Operation::UploadInvoice, &["invoices", "upload"], record)
            .await
    }

    /// Parse an invoice file's text and upload the resulting record.
    ///
    /// Unsupported or unparseable files fail before anything is sent.
    #[instrument(skip(self, content))]
    pub async fn upload_file(&self, file_name: &str, content: &str) -> Result<UploadResult> {
        let record = ingest::parse(file_name, content).map_err(|e| {
            error!(file_name, error = %e, "Invoice file rejected");
            ClientError::from(e)
        })?;
        self.upload_invoice(&record).await
    }

    /// Read an invoice file from disk, parse it and upload the record.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn upload_path(&self, path: impl AsRef<Path>) -> Result<UploadResult> {
        let record = ingest::read_invoice_file(path.as_ref()).await.map_err(|e| {
            error!(error = %e, "Invoice file rejected");
            ClientError::from(e)
        })?;
        self.upload_invoice(&record).await
    }

    /// Fetch stats, metrics and the latest log lines concurrently.
    ///
    /// Each part falls back on its own, so a slow or failing endpoint never
    /// spoils the others and the snapshot itself cannot fail.
    #[instrument(skip(self))]
    pub async fn dashboard_snapshot(&self) -> DashboardSnapshot {
        let log_query = LogQuery::new().limit(DASHBOARD_LOG_LIMIT);
        let (stats, metrics, logs) = join3(
            self.get_invoice_stats(),
            self.get_metrics(),
            self.get_processing_logs(&log_query),
        )
        .await;

        DashboardSnapshot {
            stats: stats.unwrap_or_default(),
            metrics: metrics.unwrap_or_default(),
            logs: logs.unwrap_or_default(),
        }
    }

    /// Build, send and decode a JSON call, then apply the failure policy.
    async fn call<T: DeserializeOwned>(
        &self,
        op: Operation,
        segments: &[&str],
        query: &[(&'static str, String)],
        body: Option<Value>,
    ) -> Result<T> {
        let outcome = self.fetch(op, segments, query, body).await;
        policy::apply(op, outcome)
    }

    /// Like [`call`](Self::call) with a serialized payload. Serialization
    /// happens under the policy, so its failure is logged like any other.
    async fn send_json<T, B>(&self, op: Operation, segments: &[&str], payload: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let outcome = async {
            let body = serde_json::to_value(payload)?;
            self.fetch(op, segments, &[], Some(body)).await
        }
        .await;
        policy::apply(op, outcome)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        op: Operation,
        segments: &[&str],
        query: &[(&'static str, String)],
        body: Option<Value>,
    ) -> Result<T> {
        let url = self.endpoint(segments, query)?;
        self.execute(op, url, body).await?.json()
    }

    async fn execute(&self, op: Operation, url: Url, body: Option<Value>) -> Result<ApiResponse> {
        let headers = self.auth.headers().await;
        let request = ApiRequest {
            operation: op,
            method: op.method(),
            url,
            headers,
            body,
        };
        debug!(
            operation = %op,
            method = %request.method,
            url = %request.url,
            authenticated = request.headers.is_authenticated(),
            transport = self.transport.name(),
            "Sending request"
        );
        self.transport.send(&request).await
    }

    /// Base address + percent-encoded path segments + query pairs.
    /// No `?` is added when there are no pairs.
    ///
    /// Blank, `.` and `..` segments are refused: URL normalization would
    /// drop them and the request would reach a different route.
    fn endpoint(&self, segments: &[&str], query: &[(&'static str, String)]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.trim().is_empty() || **s == "." || **s == "..")
        {
            return Err(ClientError::InvalidUrl(format!(
                "invalid path segment {:?}",
                bad
            )));
        }
        let base = self.config.base_address();
        let mut url =
            Url::parse(base).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{}: cannot be a base", base)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }
}

impl std::fmt::Debug for InvoiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoiceClient")
            .field("base_address", &self.config.base_address())
            .field("config_source", &self.config.source())
            .field("transport", &self.transport.name())
            .finish()
    }
}

/// Builder for [`InvoiceClient`].
#[derive(Default)]
pub struct InvoiceClientBuilder {
    sources: Option<ConfigSources>,
    config: Option<ClientConfig>,
    sessions: Option<Arc<dyn SessionProvider>>,
    transport: Option<Arc<dyn Transport>>,
    http_client: Option<Client>,
}

impl InvoiceClientBuilder {
    /// Resolve the base address from these sources. Default:
    /// [`ConfigSources::from_env`].
    pub fn config_sources(mut self, sources: ConfigSources) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Use an already-resolved configuration. Takes precedence over
    /// [`config_sources`](Self::config_sources).
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the identity provider. Default: [`NoSession`].
    pub fn session_provider(mut self, sessions: Arc<dyn SessionProvider>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Set the transport. Default: [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the HTTP client used by the default [`HttpTransport`].
    ///
    /// Ignored when a custom transport is set via
    /// [`transport`](Self::transport).
    pub fn client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the client. Configuration is resolved here, once.
    pub fn build(self) -> InvoiceClient {
        let config = self.config.unwrap_or_else(|| {
            ClientConfig::resolve(&self.sources.unwrap_or_else(ConfigSources::from_env))
        });
        let http_client = self.http_client;
        let transport = self.transport.unwrap_or_else(|| {
            Arc::new(HttpTransport::new(http_client.unwrap_or_default()))
        });
        InvoiceClient::new(
            config,
            self.sessions.unwrap_or_else(|| Arc::new(NoSession)),
            transport,
        )
    }
}
