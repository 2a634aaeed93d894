//! Response handling and transformation.
//!
//! # Responsibilities
//! - Represent the response to be written back to the original caller
//! - Replicate upstream headers without clobbering response headers
//! - Guarantee a well-formed content-type, falling back to JSON
//!
//! # Design Decisions
//! - Headers copy with add-if-absent semantics
//! - Content-type is set LAST so a replicated duplicate key cannot
//!   overwrite it
//! - A malformed content-type never fails the request

use axum::body::{Body, Bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;

/// Content-type used when the upstream supplies none, or an unusable one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// The gateway's internal representation of the response to be written back
/// to the original caller. Always produced, even on failure.
#[derive(Debug)]
pub struct OutboundResult {
    pub status: StatusCode,
    pub content_type: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Write an [`OutboundResult`] into an HTTP response.
///
/// Ordering matters: generic headers first (add-if-absent), content-type
/// last, so the final content-type always reflects `result.content_type`.
pub fn write_response(result: OutboundResult) -> Response {
    let mut response = Response::new(Body::from(result.body));
    *response.status_mut() = result.status;

    for name in result.headers.keys() {
        if !response.headers().contains_key(name) {
            for value in result.headers.get_all(name) {
                response.headers_mut().append(name.clone(), value.clone());
            }
        }
    }

    response
        .headers_mut()
        .insert(CONTENT_TYPE, content_type_value(&result.content_type));

    response
}

/// Parse a content-type string into a header value, substituting
/// `application/json` for empty or malformed media types.
fn content_type_value(raw: &str) -> HeaderValue {
    let essence = raw.split(';').next().unwrap_or("").trim();
    if essence.is_empty() || !essence.contains('/') {
        return HeaderValue::from_static(DEFAULT_CONTENT_TYPE);
    }
    HeaderValue::from_str(raw).unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE))
}
