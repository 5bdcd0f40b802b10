//! # Request/Response Logging Middleware
//!
//! Comprehensive logging middleware for HTTP requests and responses with structured logging,
//! request IDs, and detailed request/response data.
//!
//! This middleware logs:
//! - Request method, path, query params
//! - Request headers (sanitized)
//! - Response status, size, duration
//! - The request id set by [`stamp_req`](super::stamp_req), for correlation
//!
//! Query strings of credential endpoints are never logged.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::{Router, middleware::from_fn};
//! use lib_web::middleware::mw_logging::log_requests;
//!
//! let app = Router::new()
//!     .route("/api/conversations", get(handler))
//!     .layer(from_fn(log_requests));
//! ```

use crate::middleware::RequestStamp;
use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Sensitive headers that should not be logged
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "x-api-key",
    "x-auth-token",
    "authentication",
];

/// Endpoints carrying credentials: their query strings are not logged
const SENSITIVE_ENDPOINTS: &[&str] = &[
    "/api/auth/login",
    "/api/auth/signup",
];

const REDACTED: &str = "***REDACTED***";

/// Comprehensive request/response logging middleware
///
/// Logs detailed information about every HTTP request and response including:
/// - Method, path, query parameters
/// - Headers (with sensitive ones sanitized)
/// - Response status, size, duration
pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let request_id = req
        .extensions()
        .get::<RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let query = loggable_query(&path, req.uri().query());
    let headers = sanitize_headers(req.headers());
    let user_agent = header_str(req.headers(), "user-agent");
    let client_ip = header_str(req.headers(), "x-forwarded-for")
        .or_else(|| header_str(req.headers(), "x-real-ip"));

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        query = ?query,
        user_agent = ?user_agent,
        client_ip = ?client_ip,
        header_count = headers.len(),
        "[REQUEST] {} {}{}",
        method,
        path,
        query.as_ref().map(|q| format!("?{}", q)).unwrap_or_default()
    );
    debug!(request_id = %request_id, headers = ?headers, "[REQUEST HEADERS]");

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();
    let status_code = status.as_u16();

    // Approximate, from the content-length header
    let content_length = header_str(response.headers(), "content-length")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(0);

    if status.is_server_error() {
        error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status_code,
            duration_ms = duration.as_millis(),
            "[RESPONSE] {} {} -> {} ({}ms) [SERVER ERROR]",
            method,
            path,
            status_code,
            duration.as_millis()
        );
    } else if status.is_client_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status_code,
            duration_ms = duration.as_millis(),
            "[RESPONSE] {} {} -> {} ({}ms) [CLIENT ERROR]",
            method,
            path,
            status_code,
            duration.as_millis()
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status_code,
            duration_ms = duration.as_millis(),
            size_bytes = content_length,
            "[RESPONSE] {} {} -> {} ({}ms, {} bytes)",
            method,
            path,
            status_code,
            duration.as_millis(),
            content_length
        );
    }

    response
}

fn loggable_query(path: &str, query: Option<&str>) -> Option<String> {
    if SENSITIVE_ENDPOINTS.iter().any(|ep| path.starts_with(ep)) {
        return None;
    }
    query.map(str::to_string)
}

/// Header pairs with sensitive values replaced; non-UTF-8 values are dropped.
fn sanitize_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let name = name.as_str();
            if SENSITIVE_HEADERS.iter().any(|h| name.contains(h)) {
                Some((name.to_string(), REDACTED.to_string()))
            } else {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            }
        })
        .collect()
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
