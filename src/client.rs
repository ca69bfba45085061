//! pfSense REST API client.
//!
//! Every call returns the API's JSON [`Envelope`]. The appliance reports real
//! outcomes inside the envelope, so a 2xx transport response carrying a
//! non-200 `code` is still a failure.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::{Auth, Target};

/// Header carrying the API key for key-based authentication.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Embedded status code the API uses for success.
const API_SUCCESS_CODE: i64 = 200;

/// Errors returned by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Target host/port do not form a valid URL.
    #[error("invalid target url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Connection, TLS or protocol failure.
    #[error("error making request: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request did not finish within the target timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Response body could not be read.
    #[error("error reading response body: {0}")]
    Body(#[source] reqwest::Error),

    /// Response body is not a valid envelope.
    #[error("error decoding response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Envelope carries a non-success status code.
    #[error("received non-200 status code {code}: {message}")]
    Api { code: i64, message: String },
}

/// Outer JSON wrapper of every API response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Envelope {
    /// Embedded HTTP-like status code.
    #[serde(default)]
    pub code: i64,
    /// Status string, e.g. `"ok"`.
    #[serde(default)]
    pub status: String,
    /// Opaque response identifier.
    #[serde(default)]
    pub response_id: String,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
    /// Resource specific payload, decoded by each collector.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    /// Decode a raw response body and check the embedded status code.
    ///
    /// # Errors
    /// `ClientError::Decode` for malformed JSON, `ClientError::Api` when the
    /// embedded code is not 200.
    pub fn from_slice(body: &[u8]) -> Result<Self, ClientError> {
        let envelope: Self = serde_json::from_slice(body).map_err(ClientError::Decode)?;
        if envelope.code != API_SUCCESS_CODE {
            return Err(ClientError::Api {
                code: envelope.code,
                message: envelope.message,
            });
        }
        Ok(envelope)
    }
}

/// Authenticated client bound to one [`Target`].
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    target: Arc<Target>,
    base_url: Url,
    client: Client,
}

impl ApiClient {
    /// Build a client for the given target.
    ///
    /// # Errors
    /// Returns `ClientError::InvalidUrl` or `ClientError::Build`.
    pub fn new(target: Arc<Target>) -> Result<Self, ClientError> {
        let base_url = base_url(&target)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        // The insecure-certificate warning is emitted once when the target is validated.
        let client = Client::builder()
            .timeout(target.timeout)
            .danger_accept_invalid_certs(!target.validate_cert)
            .default_headers(headers)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            target,
            base_url,
            client,
        })
    }

    /// The target this client talks to.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Full URL for an API path. The path may include a query string.
    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    /// Perform a GET request.
    pub async fn get(&self, path: &str) -> Result<Envelope, ClientError> {
        self.fetch(Method::GET, path).await
    }

    /// Perform one request and decode the envelope.
    ///
    /// No retries are attempted.
    ///
    /// # Errors
    /// Each failure stage maps to a distinct [`ClientError`] variant.
    pub async fn fetch(&self, method: Method, path: &str) -> Result<Envelope, ClientError> {
        let url = self.url(path)?;
        tracing::debug!(host = %self.target.host, method = %method, url = %url, "Sending request");

        let mut request = self.client.request(method, url.clone());
        request = match &self.target.auth {
            Auth::Basic { username, password } => request.basic_auth(username, Some(password)),
            Auth::Key { key } => request.header(API_KEY_HEADER, key),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(self.target.timeout)
            } else {
                ClientError::Transport(e)
            }
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(self.target.timeout)
            } else {
                ClientError::Body(e)
            }
        })?;
        tracing::debug!(
            host = %self.target.host,
            url = %url,
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "Received response"
        );

        Envelope::from_slice(&body)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("host", &self.target.host)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

fn base_url(target: &Target) -> Result<Url, ClientError> {
    let host = if target.host.contains(':') && !target.host.starts_with('[') {
        format!("[{}]", target.host)
    } else {
        target.host.clone()
    };
    Ok(Url::parse(&format!(
        "{}://{}:{}/",
        target.scheme, host, target.port
    ))?)
}
