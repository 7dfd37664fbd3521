//! Transport trait and normalized request/response types.
//!
//! The [`Transport`] trait is the dispatcher's only way to reach the
//! backend. Built-in implementations: [`HttpTransport`] (reqwest) and
//! [`MockTransport`] (canned replies for tests).
//!
//! ```text
//! InvoiceClient ──► ApiRequest ──► Transport::send() ──► ApiResponse
//!                                        │
//!                             ┌──────────┴──────────┐
//!                       HttpTransport          MockTransport
//! ```

pub mod http;
pub mod mock;

pub use http::HttpTransport;
pub use mock::{MockReply, MockTransport};

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::AuthHeaders;
use crate::error::Result;
use crate::policy::Operation;
use crate::ClientError;

/// A fully built request, ready to send.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Which capability this request serves (for logging and policy).
    pub operation: Operation,
    pub method: Method,
    /// Absolute URL including the query string, if any.
    pub url: Url,
    /// Headers computed for this call by the auth provider.
    pub headers: AuthHeaders,
    /// JSON body for writes.
    pub body: Option<Value>,
}

/// Raw reply from the backend.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    /// Response body bytes, uninterpreted.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Turn a non-2xx reply into [`ClientError::HttpError`].
    pub fn error_for_status(self) -> Result<Self> {
        if (200..300).contains(&self.status) {
            Ok(self)
        } else {
            Err(ClientError::HttpError {
                status: self.status,
                body: String::from_utf8_lossy(&self.body).into_owned(),
            })
        }
    }

    /// Decode the body as JSON.
    ///
    /// An empty body (204 and friends) decodes as `null`, so it succeeds
    /// for types that accept `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Abstraction over how requests reach the backend.
///
/// Implementations must return an error for transport failures and for
/// non-2xx statuses (see [`ApiResponse::error_for_status`]); they must not
/// retry.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and wait for the full response.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_for_status() {
        let ok = ApiResponse { status: 204, body: vec![] };
        assert!(ok.error_for_status().is_ok());

        let err = ApiResponse {
            status: 401,
            body: b"Unauthorized".to_vec(),
        }
        .error_for_status()
        .unwrap_err();
        assert!(matches!(err, ClientError::HttpError { status: 401, ref body } if body == "Unauthorized"));
    }

    #[test]
    fn test_json_empty_body_is_null() {
        let resp = ApiResponse { status: 204, body: vec![] };
        let value: Value = resp.json().unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_json_decode_failure() {
        let resp = ApiResponse {
            status: 200,
            body: b"<html>gateway</html>".to_vec(),
        };
        let err = resp.json::<Value>().unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }
}
