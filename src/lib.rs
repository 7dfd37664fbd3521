//! # Invoice Client
//!
//! Authenticated API client and invoice ingestion parser for an
//! invoice-management backend.
//!
//! The crate resolves the backend endpoint once, attaches a fresh bearer
//! token to every call, and turns user-supplied invoice files into a
//! canonical record that is uploaded as JSON.
//!
//! ## Core Concepts
//!
//! - **[`ClientConfig`]** — the base address, resolved from a deployment
//!   descriptor, an environment override, or a placeholder.
//! - **[`SessionProvider`]** — the injected identity-provider capability.
//!   [`AuthProvider`] turns its sessions into [`AuthHeaders`].
//! - **[`InvoiceClient`]** — one method per backend capability, each
//!   guarded by the [`policy`] table: passive reads degrade to an empty
//!   value, detail reads and writes return the error.
//! - **[`ingest`]** — `.json` / `.csv` invoice files to [`InvoiceRecord`].
//! - **[`Transport`]** — how requests reach the backend. [`HttpTransport`]
//!   by default, [`MockTransport`] for tests.
//!
//! ## Quick Start
//!
//! ```no_run
//! use invoice_client::{InvoiceClient, StaticSession};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Base address from aws-exports.json / INVOICE_API_URL.
//!     let client = InvoiceClient::builder()
//!         .session_provider(Arc::new(StaticSession::new("eyJraWQi...")))
//!         .build();
//!
//!     let dashboard = client.dashboard_snapshot().await;
//!     println!("{} invoices", dashboard.stats.total_invoices);
//!
//!     let receipt = client
//!         .upload_file("invoice.csv", "customer_name,total_amount\nAcme,100")
//!         .await?;
//!     println!("{}", receipt);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ingest;
pub mod policy;
pub mod query;
pub mod transport;
pub mod types;

pub use auth::{AuthHeaders, AuthProvider, NoSession, Session, SessionProvider, StaticSession};
pub use client::{InvoiceClient, InvoiceClientBuilder};
pub use config::{ClientConfig, ConfigSource, ConfigSources};
pub use error::{ClientError, Result};
pub use ingest::{IngestError, InvoiceRecord, SourceFormat};
pub use policy::{FailurePolicy, FallbackShape, Operation};
pub use query::{InvoiceQuery, LogQuery};
pub use transport::{HttpTransport, MockTransport, Transport};
pub use types::{
    DashboardSnapshot, Invoice, InvoiceList, InvoiceStats, LogEntry, LogsResponse, MetricsSeries,
    SystemConfig, UploadResult,
};
