//! Backend endpoint resolution.
//!
//! [`ClientConfig`] is resolved once, when the client is built, from the
//! injected [`ConfigSources`]. Resolution never fails: sources are tried in
//! order and the first well-formed one wins.
//!
//! 1. the deployment descriptor's service endpoint (GraphQL suffix stripped)
//! 2. the environment override
//! 3. [`PLACEHOLDER_BASE_URL`]

use reqwest::Url;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Base address used when nothing else is configured (pre-deployment).
pub const PLACEHOLDER_BASE_URL: &str =
    "https://your-api-gateway-url.execute-api.us-east-1.amazonaws.com/dev";

/// Environment variable holding a base URL override.
pub const API_URL_ENV: &str = "INVOICE_API_URL";

/// Environment variable naming the deployment descriptor file.
pub const DESCRIPTOR_PATH_ENV: &str = "INVOICE_DESCRIPTOR_PATH";

/// Descriptor file read by [`ConfigSources::from_env`] when
/// [`DESCRIPTOR_PATH_ENV`] is unset.
pub const DEFAULT_DESCRIPTOR_PATH: &str = "aws-exports.json";

/// Where a resolved base address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Descriptor,
    Environment,
    Placeholder,
}

/// Raw configuration inputs, injected into the client builder.
///
/// # Example
///
/// ```
/// use invoice_client::config::{ClientConfig, ConfigSource, ConfigSources};
///
/// let sources = ConfigSources::new()
///     .descriptor(r#"{"aws_appsync_graphqlEndpoint": "https://abc.appsync-api.eu-west-1.amazonaws.com/graphql"}"#)
///     .env_override("http://localhost:3000");
///
/// let config = ClientConfig::resolve(&sources);
/// assert_eq!(config.base_address(), "https://abc.appsync-api.eu-west-1.amazonaws.com");
/// assert_eq!(config.source(), ConfigSource::Descriptor);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Text of the generated deployment descriptor, if one exists.
    pub descriptor: Option<String>,
    /// Base URL supplied by the environment.
    pub env_override: Option<String>,
}

impl ConfigSources {
    /// No sources: resolves to the placeholder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deployment descriptor text.
    pub fn descriptor(mut self, text: impl Into<String>) -> Self {
        self.descriptor = Some(text.into());
        self
    }

    /// Set the environment override.
    pub fn env_override(mut self, url: impl Into<String>) -> Self {
        self.env_override = Some(url.into());
        self
    }

    /// Read the descriptor from a file. A missing or unreadable file leaves
    /// the descriptor unset.
    pub fn descriptor_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => self.descriptor = Some(text),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No deployment descriptor");
            }
        }
        self
    }

    /// Collect sources from the process environment.
    ///
    /// Reads the descriptor named by [`DESCRIPTOR_PATH_ENV`] (default
    /// [`DEFAULT_DESCRIPTOR_PATH`]) and the override from [`API_URL_ENV`].
    pub fn from_env() -> Self {
        let path =
            std::env::var(DESCRIPTOR_PATH_ENV).unwrap_or_else(|_| DEFAULT_DESCRIPTOR_PATH.into());
        let sources = Self::new().descriptor_file(path);
        match std::env::var(API_URL_ENV) {
            Ok(url) => sources.env_override(url),
            Err(_) => sources,
        }
    }
}

/// Resolved client configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_address: String,
    source: ConfigSource,
}

impl ClientConfig {
    /// Resolve the base address: descriptor, then environment, then placeholder.
    pub fn resolve(sources: &ConfigSources) -> Self {
        if let Some(base) = sources.descriptor.as_deref().and_then(endpoint_from_descriptor) {
            debug!(base_address = %base, "Base address from deployment descriptor");
            return Self {
                base_address: base,
                source: ConfigSource::Descriptor,
            };
        }

        if let Some(raw) = sources.env_override.as_deref() {
            match well_formed(raw) {
                Some(base) => {
                    debug!(base_address = %base, "Base address from environment");
                    return Self {
                        base_address: base,
                        source: ConfigSource::Environment,
                    };
                }
                None if raw.trim().is_empty() => {}
                None => warn!(value = %raw, "Ignoring malformed {} value", API_URL_ENV),
            }
        }

        warn!(
            base_address = PLACEHOLDER_BASE_URL,
            "No backend endpoint configured; using placeholder"
        );
        Self {
            base_address: PLACEHOLDER_BASE_URL.to_string(),
            source: ConfigSource::Placeholder,
        }
    }

    /// Resolve from the process environment. See [`ConfigSources::from_env`].
    pub fn from_env() -> Self {
        Self::resolve(&ConfigSources::from_env())
    }

    /// Scheme-qualified base URL, without a trailing slash.
    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// True when no real endpoint was configured.
    pub fn is_placeholder(&self) -> bool {
        self.source == ConfigSource::Placeholder
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::resolve(&ConfigSources::new())
    }
}

/// The parts of a generated deployment descriptor we care about.
#[derive(Debug, Deserialize)]
struct DeploymentDescriptor {
    #[serde(rename = "aws_appsync_graphqlEndpoint")]
    graphql_endpoint: Option<String>,
    api: Option<ApiSection>,
    #[serde(rename = "apiEndpoint")]
    api_endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSection {
    endpoint: Option<String>,
}

fn endpoint_from_descriptor(text: &str) -> Option<String> {
    let descriptor: DeploymentDescriptor = match serde_json::from_str(text) {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed deployment descriptor");
            return None;
        }
    };

    let endpoint = descriptor
        .graphql_endpoint
        .or_else(|| descriptor.api.and_then(|a| a.endpoint))
        .or(descriptor.api_endpoint)?;

    let base = well_formed(&strip_graphql_suffix(&endpoint));
    if base.is_none() {
        warn!(endpoint = %endpoint, "Ignoring malformed descriptor endpoint");
    }
    base
}

/// Strip a trailing `/graphql` segment (and slashes) from a service endpoint.
/// e.g., "https://x.appsync-api.us-east-1.amazonaws.com/graphql" -> "https://x.appsync-api.us-east-1.amazonaws.com"
fn strip_graphql_suffix(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/graphql")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

/// An absolute http(s) URL with a host, returned without a trailing slash.
fn well_formed(candidate: &str) -> Option<String> {
    let trimmed = candidate.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).ok()?;
    let scheme_ok = matches!(url.scheme(), "http" | "https");
    if scheme_ok && url.host_str().is_some_and(|h| !h.is_empty()) {
        Some(trimmed.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DESCRIPTOR: &str = r#"{
        "aws_project_region": "us-east-1",
        "aws_appsync_graphqlEndpoint": "https://abc123.appsync-api.us-east-1.amazonaws.com/graphql",
        "aws_appsync_authenticationType": "AMAZON_COGNITO_USER_POOLS"
    }"#;

    #[test]
    fn test_descriptor_wins() {
        let config = ClientConfig::resolve(
            &ConfigSources::new()
                .descriptor(DESCRIPTOR)
                .env_override("https://env.example.com/dev"),
        );
        assert_eq!(
            config.base_address(),
            "https://abc123.appsync-api.us-east-1.amazonaws.com"
        );
        assert_eq!(config.source(), ConfigSource::Descriptor);
    }

    #[test]
    fn test_malformed_descriptor_falls_back_to_env() {
        let config = ClientConfig::resolve(
            &ConfigSources::new()
                .descriptor("{ not json")
                .env_override("https://env.example.com/dev/"),
        );
        assert_eq!(config.base_address(), "https://env.example.com/dev");
        assert_eq!(config.source(), ConfigSource::Environment);
    }

    #[test]
    fn test_descriptor_without_endpoint_falls_back_to_env() {
        let config = ClientConfig::resolve(
            &ConfigSources::new()
                .descriptor(r#"{"aws_project_region": "us-east-1"}"#)
                .env_override("http://localhost:3000"),
        );
        assert_eq!(config.base_address(), "http://localhost:3000");
    }

    #[test]
    fn test_descriptor_endpoint_not_a_url() {
        let config = ClientConfig::resolve(
            &ConfigSources::new().descriptor(r#"{"aws_appsync_graphqlEndpoint": "graphql"}"#),
        );
        assert!(config.is_placeholder());
    }

    #[test]
    fn test_nothing_configured_uses_placeholder() {
        let config = ClientConfig::resolve(&ConfigSources::new());
        assert_eq!(config.base_address(), PLACEHOLDER_BASE_URL);
        assert!(config.is_placeholder());
    }

    #[test]
    fn test_malformed_env_uses_placeholder() {
        for raw in ["", "   ", "not a url", "ftp://files.example.com", "localhost:3000"] {
            let config = ClientConfig::resolve(&ConfigSources::new().env_override(raw));
            assert!(config.is_placeholder(), "{raw:?}");
        }
    }

    #[test]
    fn test_every_source_yields_scheme_qualified_url() {
        let cases = [
            ConfigSources::new().descriptor(DESCRIPTOR),
            ConfigSources::new().descriptor("[]"),
            ConfigSources::new().env_override("https://env.example.com"),
            ConfigSources::new(),
        ];
        for sources in &cases {
            let config = ClientConfig::resolve(sources);
            assert!(!config.base_address().is_empty());
            assert!(Url::parse(config.base_address()).is_ok());
        }
    }

    #[test]
    fn test_alternate_descriptor_fields() {
        let nested = ClientConfig::resolve(
            &ConfigSources::new().descriptor(r#"{"api": {"endpoint": "https://api.example.com/prod/"}}"#),
        );
        assert_eq!(nested.base_address(), "https://api.example.com/prod");

        let flat = ClientConfig::resolve(
            &ConfigSources::new().descriptor(r#"{"apiEndpoint": "https://flat.example.com"}"#),
        );
        assert_eq!(flat.base_address(), "https://flat.example.com");
    }

    #[test]
    fn test_strip_graphql_suffix() {
        assert_eq!(strip_graphql_suffix("https://a.com/graphql"), "https://a.com");
        assert_eq!(strip_graphql_suffix("https://a.com/graphql/"), "https://a.com");
        assert_eq!(strip_graphql_suffix("https://a.com/dev"), "https://a.com/dev");
    }

    #[test]
    fn test_descriptor_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DESCRIPTOR.as_bytes()).unwrap();

        let sources = ConfigSources::new().descriptor_file(file.path());
        assert_eq!(ClientConfig::resolve(&sources).source(), ConfigSource::Descriptor);
    }

    #[test]
    fn test_missing_descriptor_file_is_absent() {
        let sources = ConfigSources::new().descriptor_file("/nonexistent/aws-exports.json");
        assert!(sources.descriptor.is_none());
    }
}
