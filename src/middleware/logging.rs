//! Request logging middleware.
//!
//! Logs every HTTP request with method, path, status code, and latency.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn, Instrument};

/// Middleware that logs HTTP requests with timing information.
///
/// INFO for anything below 500, WARN for server errors. Health checks are skipped.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if path == "/health" {
        return next.run(request).await;
    }

    let start = Instant::now();
    let span = tracing::info_span!("http_request", method = %method, path = %path);

    let response = next.run(request).instrument(span).await;

    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if status >= 500 {
        warn!(
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Request failed (5xx)"
        );
    } else if status >= 400 {
        info!(
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Request completed (4xx)"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status,
            latency_ms,
            "Request completed"
        );
    }

    response
}
