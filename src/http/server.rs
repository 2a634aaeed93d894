//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy routes
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch every supported verb to one forwarding handler
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::{GatewayConfig, LimitsConfig};
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::http::response::write_response;
use crate::observability::metrics;
use crate::proxy::{Forwarder, InboundRequest};

/// Route prefix stripped from inbound URIs to obtain the upstream suffix.
const PROXY_PREFIX: &str = "/api/proxy";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub limits: LimitsConfig,
}

/// HTTP server for the forwarding gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and an
    /// already-constructed forwarder.
    pub fn new(config: GatewayConfig, forwarder: Forwarder) -> Self {
        let state = AppState {
            forwarder: Arc::new(forwarder),
            limits: config.limits.clone(),
        };

        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Five thin method registrations, one handler: the verb reaches the
    /// handler as data instead of five near-duplicate entry points.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let proxy = get(proxy_handler)
            .post(proxy_handler)
            .put(proxy_handler)
            .patch(proxy_handler)
            .delete(proxy_handler);

        Router::new()
            .route(PROXY_PREFIX, proxy.clone())
            .route(&format!("{}/{{*path}}", PROXY_PREFIX), proxy)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until the
    /// shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
///
/// Reduces the inbound request to an [`InboundRequest`], forwards it, and
/// writes the single terminal response. If the inbound connection aborts,
/// the runtime drops this future and the in-flight upstream call with it.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let method = request.method().clone();

    // The suffix and query come from the raw URI, not the decoded Path
    // extractor: already-escaped sequences must survive verbatim.
    let path_suffix = request
        .uri()
        .path()
        .strip_prefix(PROXY_PREFIX)
        .unwrap_or("")
        .trim_start_matches('/')
        .to_string();
    let query = request
        .uri()
        .query()
        .map(|q| format!("?{}", q))
        .unwrap_or_default();

    let content_type = request.headers().get(CONTENT_TYPE).cloned();
    let (parts, body) = request.into_parts();

    let body_bytes = match axum::body::to_bytes(body, state.limits.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejecting oversized or unreadable body");
            metrics::record_request(method.as_str(), 413, start_time);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path_suffix,
        "Forwarding request"
    );

    let inbound = InboundRequest {
        method: method.clone(),
        path_suffix,
        query,
        content_type,
        headers: parts.headers,
        body: if body_bytes.is_empty() {
            None
        } else {
            Some(body_bytes)
        },
    };

    let result = state.forwarder.forward(inbound).await;

    metrics::record_request(method.as_str(), result.status.as_u16(), start_time);
    tracing::debug!(
        request_id = %request_id,
        status = %result.status,
        "Upstream response relayed"
    );

    write_response(result)
}
