//! Mock transport for testing without a live backend.
//!
//! [`MockTransport`] returns pre-configured replies in order and records
//! every request it receives, so downstream code can assert on URLs,
//! headers and bodies.
//!
//! # Example
//!
//! ```
//! use invoice_client::transport::MockTransport;
//! use serde_json::json;
//!
//! let mock = MockTransport::json(json!({"invoices": [], "total": 0}));
//! assert!(mock.requests().is_empty());
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::Result;
use crate::ClientError;

/// One canned outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A response with the given status and body.
    Response { status: u16, body: Vec<u8> },
    /// The request never produced a response.
    ConnectionFailed(String),
}

/// A test transport that replays canned replies in order.
///
/// Cycles back to the beginning when all replies have been consumed.
#[derive(Debug)]
pub struct MockTransport {
    replies: Vec<MockReply>,
    index: AtomicUsize,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    /// Create a mock with the given replies.
    pub fn new(replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "MockTransport requires at least one reply");
        Self {
            replies,
            index: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer 200 with this JSON body.
    pub fn json(body: Value) -> Self {
        Self::new(vec![MockReply::Response {
            status: 200,
            body: body.to_string().into_bytes(),
        }])
    }

    /// Always answer 200 with these raw bytes.
    pub fn bytes(body: impl Into<Vec<u8>>) -> Self {
        Self::new(vec![MockReply::Response {
            status: 200,
            body: body.into(),
        }])
    }

    /// Always answer with this status and text body.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::new(vec![MockReply::Response {
            status,
            body: body.into().into_bytes(),
        }])
    }

    /// Always fail before a response arrives.
    pub fn unreachable() -> Self {
        Self::new(vec![MockReply::ConnectionFailed("connection refused".into())])
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests().pop()
    }

    fn next_reply(&self) -> MockReply {
        let idx = self.index.fetch_add(1, Ordering::Relaxed) % self.replies.len();
        self.replies[idx].clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        match self.next_reply() {
            MockReply::Response { status, body } => ApiResponse { status, body }.error_for_status(),
            MockReply::ConnectionFailed(reason) => Err(ClientError::Connection(reason)),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
