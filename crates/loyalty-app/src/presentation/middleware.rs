use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tracing::{info, warn};

/// One log line per request: method, path, status and latency
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = started_at.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        warn!(%method, %path, status, latency_ms, "[http] request failed");
    } else {
        info!(%method, %path, status, latency_ms, "[http] request completed");
    }

    response
}
