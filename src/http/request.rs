//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) as early as possible
//! - Preserve a caller-supplied ID so traces correlate across hops
//!
//! # Design Decisions
//! - Implemented as a tower layer so it runs before the proxy handler
//! - The ID is only added, never overwritten

use std::task::{Context, Poll};

use axum::http::{HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer that stamps each request with an `x-request-id` header.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Middleware service produced by [`RequestIdLayer`].
#[derive(Clone, Debug)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if !request.headers().contains_key(X_REQUEST_ID) {
            let id = Uuid::new_v4().to_string();
            // UUID text is always a valid header value.
            if let Ok(value) = HeaderValue::from_str(&id) {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Response;
    use std::convert::Infallible;
    use tower::ServiceExt;

    #[tokio::test]
    async fn adds_request_id_when_absent() {
        let service = RequestIdLayer.layer(tower::service_fn(|req: Request<Body>| async move {
            let id = req
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            Ok::<_, Infallible>(Response::new(id.unwrap_or_default()))
        }));

        let response = service
            .oneshot(Request::new(Body::empty()))
            .await
            .unwrap();
        assert!(!response.body().is_empty());
    }

    #[tokio::test]
    async fn preserves_existing_request_id() {
        let service = RequestIdLayer.layer(tower::service_fn(|req: Request<Body>| async move {
            let id = req
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            Ok::<_, Infallible>(Response::new(id.unwrap_or_default()))
        }));

        let request = Request::builder()
            .header(X_REQUEST_ID, "caller-supplied")
            .body(Body::empty())
            .unwrap();

        let response = service.oneshot(request).await.unwrap();
        assert_eq!(response.body(), "caller-supplied");
    }
}
