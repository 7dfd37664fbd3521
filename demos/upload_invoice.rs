//! Example: parse an invoice file and upload it.
//!
//! Run with: `cargo run --example upload_invoice -- path/to/invoice.csv`
//!
//! Without a path, a built-in CSV invoice is uploaded to a mock backend.

use invoice_client::config::ConfigSources;
use invoice_client::{ingest, InvoiceClient, MockTransport, StaticSession};
use serde_json::json;
use std::sync::Arc;

const SAMPLE_CSV: &str = "customer_name,total_amount,currency,country\nAcme Corp, 1250.00 ,USD,US\n";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("invoice_client=debug")
        .init();

    let sessions = Arc::new(StaticSession::new(
        std::env::var("INVOICE_API_TOKEN").unwrap_or_else(|_| "demo-token".into()),
    ));

    match std::env::args().nth(1) {
        Some(path) => {
            let client = InvoiceClient::builder().session_provider(sessions).build();
            let receipt = client.upload_path(&path).await?;
            println!("Uploaded {}: {}", path, receipt);
        }
        None => {
            let record = ingest::parse("sample.csv", SAMPLE_CSV)?;
            println!("Parsed record:");
            for (field, value) in record.iter() {
                println!("  {} = {}", field, value);
            }

            let mock = Arc::new(MockTransport::json(json!({
                "invoiceId": "demo-0001",
                "status": "PROCESSING"
            })));
            let client = InvoiceClient::builder()
                .config_sources(ConfigSources::new().env_override("https://api.example.com/dev"))
                .session_provider(sessions)
                .transport(mock.clone())
                .build();

            let receipt = client.upload_invoice(&record).await?;
            println!("Backend replied: {}", receipt);
            if let Some(req) = mock.last_request() {
                println!("Sent {} {}", req.method, req.url);
            }
        }
    }

    Ok(())
}
