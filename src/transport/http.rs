//! Transport over real HTTP, via `reqwest`.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::Result;

/// Sends requests with a `reqwest::Client`.
///
/// No timeout or retry is added here; the client's own settings apply.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Use a preconfigured client (proxies, TLS roots, timeouts).
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.to_header_map());
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        debug!(
            operation = %request.operation,
            status,
            bytes = body.len(),
            "Response received"
        );

        ApiResponse { status, body }.error_for_status()
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthHeaders;
    use crate::policy::Operation;
    use crate::ClientError;
    use reqwest::{Method, Url};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(server: &MockServer, op: Operation, route: &str) -> ApiRequest {
        ApiRequest {
            operation: op,
            method: op.method(),
            url: Url::parse(&format!("{}{}", server.uri(), route)).unwrap(),
            headers: AuthHeaders::bearer("abc"),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/metrics"))
            .and(header("Authorization", "Bearer abc"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"processingTime": []})))
            .expect(1)
            .mount(&server)
            .await;

        let resp = HttpTransport::default()
            .send(&request(&server, Operation::Metrics, "/metrics"))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
    }

    #[tokio::test]
    async fn test_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/config"))
            .and(body_json(json!({"maxRetries": 3})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"maxRetries": 3})))
            .expect(1)
            .mount(&server)
            .await;

        let mut req = request(&server, Operation::SetConfig, "/config");
        assert_eq!(req.method, Method::PUT);
        req.body = Some(json!({"maxRetries": 3}));

        let resp = HttpTransport::default().send(&req).await.unwrap();
        assert_eq!(resp.json::<serde_json::Value>().unwrap(), json!({"maxRetries": 3}));
    }

    #[tokio::test]
    async fn test_non_success_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/invoices/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Invoice not found"))
            .mount(&server)
            .await;

        let err = HttpTransport::default()
            .send(&request(&server, Operation::GetInvoice, "/invoices/missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::HttpError { status: 404, ref body } if body == "Invoice not found"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_request_error() {
        let req = ApiRequest {
            operation: Operation::Stats,
            method: Method::GET,
            url: Url::parse("http://127.0.0.1:9/invoices/stats").unwrap(),
            headers: AuthHeaders::anonymous(),
            body: None,
        };
        let err = HttpTransport::default().send(&req).await.unwrap_err();
        assert!(matches!(err, ClientError::Request(_)));
        assert!(err.is_transport());
    }
}
