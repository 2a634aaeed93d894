//! The forwarding core: one inbound request in, one outbound result out.

use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};

use crate::http::response::{OutboundResult, DEFAULT_CONTENT_TYPE};
use crate::upstream::{UpstreamClient, UpstreamError};

/// Inbound headers propagated to the upstream, matched case-insensitively.
///
/// `If-Match` drives optimistic concurrency and `ConsistencyLevel` drives
/// eventually-consistent queries; everything else (host, auth, hop-by-hop)
/// must not leak across the trust boundary.
const FORWARDED_HEADERS: [&str; 2] = ["if-match", "consistencylevel"];

/// A single inbound request, reduced to what forwarding needs.
///
/// Scoped to one request lifecycle; owned exclusively by its handler task.
#[derive(Debug)]
pub struct InboundRequest {
    /// One of GET/POST/PUT/PATCH/DELETE; the routes expose no other verbs.
    pub method: Method,
    /// Raw path suffix after the proxy mount point, never URL-decoded.
    pub path_suffix: String,
    /// Raw query string including the leading `?`, or empty.
    pub query: String,
    /// Inbound content-type, passed through to the upstream request.
    pub content_type: Option<HeaderValue>,
    /// Full inbound header map; only whitelisted entries are forwarded.
    pub headers: HeaderMap,
    /// Opaque payload for POST/PUT/PATCH; `None` for GET/DELETE.
    pub body: Option<Bytes>,
}

/// Translates inbound requests into upstream calls and maps the outcome
/// back into an [`OutboundResult`].
pub struct Forwarder {
    client: UpstreamClient,
}

impl Forwarder {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    /// Target URL for a path suffix and raw query string, concatenated
    /// verbatim onto the version-stripped upstream base.
    pub fn target_url(&self, path_suffix: &str, query: &str) -> String {
        format!("{}/{}{}", self.client.forward_base(), path_suffix, query)
    }

    /// Forward one request upstream.
    ///
    /// Always returns a result: service errors replay the upstream status
    /// with the serialized detail as body, transport failures map to 502.
    pub async fn forward(&self, inbound: InboundRequest) -> OutboundResult {
        let url = self.target_url(&inbound.path_suffix, &inbound.query);
        let upstream_headers = forwarded_subset(&inbound.headers);

        tracing::debug!(
            method = %inbound.method,
            target = %url,
            "Dispatching upstream request"
        );

        match self
            .client
            .send(
                inbound.method,
                &url,
                inbound.content_type,
                upstream_headers,
                inbound.body,
            )
            .await
        {
            Ok(response) => {
                let content_type = response
                    .headers
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();

                OutboundResult {
                    status: response.status,
                    content_type,
                    headers: replicated_headers(response.headers),
                    body: response.body,
                }
            }
            Err(UpstreamError::Service { status, detail }) => {
                tracing::warn!(status = %status, "Upstream reported an error");
                OutboundResult {
                    status,
                    content_type: DEFAULT_CONTENT_TYPE.to_string(),
                    headers: HeaderMap::new(),
                    body: Bytes::from(detail.to_string()),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, target = %url, "Upstream request failed");
                let detail = serde_json::json!({
                    "error": { "code": "BadGateway", "message": e.to_string() }
                });
                OutboundResult {
                    status: StatusCode::BAD_GATEWAY,
                    content_type: DEFAULT_CONTENT_TYPE.to_string(),
                    headers: HeaderMap::new(),
                    body: Bytes::from(detail.to_string()),
                }
            }
        }
    }
}

/// Extract the whitelisted subset of inbound headers.
///
/// `HeaderName` is already lowercase, so the match is case-insensitive with
/// respect to whatever the caller sent.
fn forwarded_subset(headers: &HeaderMap) -> HeaderMap {
    let mut subset = HeaderMap::new();
    for name in headers.keys() {
        if FORWARDED_HEADERS.contains(&name.as_str()) {
            for value in headers.get_all(name) {
                subset.append(name.clone(), value.clone());
            }
        }
    }
    subset
}

/// Upstream response headers replicated onto the outbound response.
///
/// Framing headers are dropped: the body was fully buffered, so the outbound
/// layer recomputes length and the upstream's connection semantics no longer
/// apply.
fn replicated_headers(mut headers: HeaderMap) -> HeaderMap {
    headers.remove(axum::http::header::CONNECTION);
    headers.remove(axum::http::header::TRANSFER_ENCODING);
    headers.remove(axum::http::header::CONTENT_LENGTH);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{HeaderName, AUTHORIZATION, CONTENT_LENGTH};

    use crate::config::{TimeoutConfig, UpstreamConfig};

    #[test]
    fn target_url_concatenates_verbatim() {
        let mut upstream = UpstreamConfig::default();
        upstream.endpoint = "http://127.0.0.1:9000/v1.0".into();
        let client = UpstreamClient::new(&upstream, &TimeoutConfig::default()).unwrap();
        let forwarder = Forwarder::new(client);

        assert_eq!(
            forwarder.target_url("users/a%20b", "?$count=true"),
            "http://127.0.0.1:9000/users/a%20b?$count=true"
        );
        assert_eq!(forwarder.target_url("", ""), "http://127.0.0.1:9000/");
    }

    #[test]
    fn whitelist_keeps_only_recognized_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("x"));
        // Wire parsing normalizes names; FromStr does the same here.
        headers.insert(
            "If-Match".parse::<HeaderName>().unwrap(),
            HeaderValue::from_static("abc"),
        );
        headers.insert(
            "Cookie".parse::<HeaderName>().unwrap(),
            HeaderValue::from_static("session=1"),
        );

        let subset = forwarded_subset(&headers);
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.get("if-match").unwrap(), "abc");
    }

    #[test]
    fn whitelist_matches_case_insensitively() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "ConsistencyLevel".parse::<HeaderName>().unwrap(),
            HeaderValue::from_static("eventual"),
        );

        let subset = forwarded_subset(&headers);
        assert_eq!(subset.get("consistencylevel").unwrap(), "eventual");
    }

    #[test]
    fn replication_drops_framing_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("42"));
        headers.insert("request-id", HeaderValue::from_static("r-1"));

        let replicated = replicated_headers(headers);
        assert!(replicated.get(CONTENT_LENGTH).is_none());
        assert_eq!(replicated.get("request-id").unwrap(), "r-1");
    }
}
