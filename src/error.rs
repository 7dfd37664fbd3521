use thiserror::Error;

use crate::ingest::IngestError;

/// Errors produced by the client and its components.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Low-level HTTP transport failure (connection refused, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request never got a response (used by transports other than reqwest).
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A response body could not be decoded into the expected shape.
    #[error("JSON decoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpError {
        /// HTTP status code (e.g. 401, 404, 500).
        status: u16,
        /// Response body text.
        body: String,
    },

    /// An endpoint URL could not be built from the base address.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// An invoice file could not be turned into an invoice record.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Whether this error came from talking to the backend, as opposed to
    /// preparing the request locally.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Request(_)
                | ClientError::Connection(_)
                | ClientError::HttpError { .. }
                | ClientError::Json(_)
        )
    }

    /// HTTP status code, when the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::HttpError { status, .. } => Some(*status),
            ClientError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for ClientError {
    fn from(err: anyhow::Error) -> Self {
        ClientError::Other(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
