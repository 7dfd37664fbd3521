//! Per-call authentication headers.
//!
//! The identity provider is injected as a [`SessionProvider`]. [`AuthProvider`]
//! asks it for the current session on every call and never caches the
//! result, since tokens rotate during refresh windows.
//!
//! A missing or failing session is not an error here: the request goes out
//! without `Authorization` and the backend answers with its own 401.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// The identity provider's view of the signed-in principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Bearer token, if the session carries one.
    pub access_token: Option<String>,
}

impl Session {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
        }
    }
}

/// Capability to fetch the currently active session.
///
/// `Ok(None)` means nobody is signed in. Errors are foreign to this crate
/// (SDK, network, misconfiguration) and are only ever logged.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> anyhow::Result<Option<Session>>;
}

/// Provider for anonymous use: there is never a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

#[async_trait]
impl SessionProvider for NoSession {
    async fn current_session(&self) -> anyhow::Result<Option<Session>> {
        Ok(None)
    }
}

/// Provider that always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticSession {
    token: String,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_session(&self) -> anyhow::Result<Option<Session>> {
        Ok(Some(Session::with_token(self.token.clone())))
    }
}

/// Header name to value mapping sent with every request.
///
/// Always has `Content-Type: application/json`; has
/// `Authorization: Bearer <token>` only when a session token was available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders(BTreeMap<String, String>);

impl AuthHeaders {
    /// JSON content type only.
    pub fn anonymous() -> Self {
        let mut map = BTreeMap::new();
        map.insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());
        Self(map)
    }

    /// JSON content type plus a bearer token.
    pub fn bearer(token: &str) -> Self {
        let mut headers = Self::anonymous();
        headers
            .0
            .insert(AUTHORIZATION.to_string(), format!("Bearer {}", token));
        headers
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_authenticated(&self) -> bool {
        self.contains(AUTHORIZATION)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convert to a `reqwest` header map. Entries that are not valid HTTP
    /// header names or values (e.g. a token with a newline) are dropped.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in self.iter() {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(n), Ok(v)) => {
                    map.insert(n, v);
                }
                _ => warn!(header = %name, "Dropping header with invalid name or value"),
            }
        }
        map
    }
}

/// Produces [`AuthHeaders`] from the injected session provider.
#[derive(Clone)]
pub struct AuthProvider {
    sessions: Arc<dyn SessionProvider>,
}

impl AuthProvider {
    pub fn new(sessions: Arc<dyn SessionProvider>) -> Self {
        Self { sessions }
    }

    /// Headers for the next request.
    ///
    /// Never fails: when the session cannot be obtained, or carries no
    /// token, the JSON-only variant is returned.
    pub async fn headers(&self) -> AuthHeaders {
        match self.sessions.current_session().await {
            Ok(Some(Session {
                access_token: Some(token),
            })) if !token.is_empty() => AuthHeaders::bearer(&token),
            Ok(_) => {
                debug!("No active session; sending unauthenticated request");
                AuthHeaders::anonymous()
            }
            Err(e) => {
                warn!(error = %e, "Failed to get current session; sending unauthenticated request");
                AuthHeaders::anonymous()
            }
        }
    }
}

impl Default for AuthProvider {
    fn default() -> Self {
        Self::new(Arc::new(NoSession))
    }
}

impl std::fmt::Debug for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthProvider").finish_non_exhaustive()
    }
}
