//! Credentialed HTTP client for the upstream API.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};

/// Error type for upstream operations.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream rejected or failed the request with a known status code
    /// and a structured error payload.
    #[error("upstream returned {status}")]
    Service {
        status: StatusCode,
        detail: serde_json::Value,
    },

    /// The upstream could not be reached or the exchange failed below the
    /// HTTP layer (connect refused, timeout, connection reset).
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured endpoint is not a usable URL.
    #[error("invalid upstream endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The configured bearer token cannot be carried in a header.
    #[error("invalid bearer token")]
    Credential,
}

/// A fully buffered upstream response.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Already-authenticated HTTP client bound to a fixed upstream base URL.
///
/// Constructed once at startup and shared read-only across all in-flight
/// requests. The forwarding base is the configured endpoint with its trailing
/// version segment removed, so callers address any API version through the
/// path suffix.
pub struct UpstreamClient {
    client: reqwest::Client,
    forward_base: String,
    authorization: Option<HeaderValue>,
}

impl UpstreamClient {
    /// Build a client from configuration.
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, UpstreamError> {
        let endpoint = upstream.endpoint.trim_end_matches('/');
        Url::parse(endpoint)?;

        let authorization = match &upstream.bearer_token {
            Some(token) => Some(
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| UpstreamError::Credential)?,
            ),
            None => None,
        };

        // Redirects are relayed to the caller, never followed: chasing a
        // Location cross-host would re-send the whitelisted headers and any
        // bearer token to a host the caller never addressed.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()?;

        Ok(Self {
            client,
            forward_base: strip_version_segment(endpoint).to_string(),
            authorization,
        })
    }

    /// The configured endpoint with its trailing version segment removed.
    pub fn forward_base(&self) -> &str {
        &self.forward_base
    }

    /// Send a request to the given upstream URL and buffer the full response.
    ///
    /// Statuses below 400 return `Ok`; 4xx/5xx responses are surfaced as
    /// [`UpstreamError::Service`] with the body parsed into a JSON detail.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        content_type: Option<HeaderValue>,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let mut request = self.client.request(method, url);

        if let Some(auth) = &self.authorization {
            request = request.header(AUTHORIZATION, auth.clone());
        }
        if let Some(ct) = content_type {
            request = request.header(CONTENT_TYPE, ct);
        }
        for (name, value) in headers.iter() {
            request = request.header(name, value.clone());
        }
        if let Some(bytes) = body {
            request = request.body(bytes);
        }

        let response = request.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        // Full read before any outbound write: status and content-type must
        // be inspected before the response to the caller is started.
        let body = response.bytes().await?;

        if status.is_client_error() || status.is_server_error() {
            return Err(UpstreamError::Service {
                status,
                detail: parse_error_detail(&body),
            });
        }

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// Strip the final path segment (the API version marker) from an endpoint.
fn strip_version_segment(endpoint: &str) -> &str {
    match endpoint.rfind('/') {
        Some(idx) => &endpoint[..idx],
        None => endpoint,
    }
}

/// Best-effort parse of an upstream error body into a structured detail.
///
/// Non-JSON bodies are wrapped so the caller always receives a JSON object.
fn parse_error_detail(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap_or_else(|_| {
        serde_json::json!({
            "error": { "message": String::from_utf8_lossy(body) }
        })
    })
}
