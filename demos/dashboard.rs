//! Example: load the dashboard against the configured backend.
//!
//! Run with: `INVOICE_API_URL=https://... INVOICE_API_TOKEN=... cargo run --example dashboard`
//!
//! Unreachable endpoints still print a (zeroed) dashboard.

use invoice_client::{InvoiceClient, InvoiceQuery, NoSession, SessionProvider, StaticSession};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invoice_client=info".into()),
        )
        .init();

    let sessions: Arc<dyn SessionProvider> = match std::env::var("INVOICE_API_TOKEN") {
        Ok(token) => Arc::new(StaticSession::new(token)),
        Err(_) => Arc::new(NoSession),
    };
    let client = InvoiceClient::builder().session_provider(sessions).build();

    if client.config().is_placeholder() {
        println!("No backend configured; set INVOICE_API_URL or provide aws-exports.json");
    }
    println!("Backend: {}", client.base_address());

    let dashboard = client.dashboard_snapshot().await;
    println!("Total invoices:   {}", dashboard.stats.total_invoices);
    println!("Processed today:  {}", dashboard.stats.processed_today);
    println!("Error rate:       {}", dashboard.stats.error_rate);
    println!("Avg. processing:  {}s", dashboard.stats.average_processing_time);

    println!("\nRecent activity:");
    for log in &dashboard.logs.logs {
        let when = log
            .timestamp
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| log.timestamp.to_string());
        match &log.invoice_id {
            Some(id) => println!("  {} [{}] {} (invoice {})", when, log.level, log.message, id),
            None => println!("  {} [{}] {}", when, log.level, log.message),
        }
    }

    let failed = client
        .list_invoices(&InvoiceQuery::new().status("ERROR").limit(100))
        .await
        .unwrap_or_default();
    println!("\n{} invoices in ERROR", failed.total);
}
