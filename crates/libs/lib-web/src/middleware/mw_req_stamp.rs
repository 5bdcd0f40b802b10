//! # Request Stamping Middleware
//!
//! Adds request metadata (ID, timestamp) to requests for tracing and debugging.
//!
//! This middleware generates a unique request ID and adds it to request extensions
//! and response headers, enabling request tracing across the application.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::{Router, middleware::from_fn};
//! use lib_web::middleware::mw_req_stamp::stamp_req;
//!
//! let app = Router::new()
//!     .route("/api/conversations", get(handler))
//!     .layer(from_fn(stamp_req));
//! ```
//!
//! Request ID is available in handlers via `Extension<RequestStamp>`:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use lib_web::middleware::mw_req_stamp::RequestStamp;
//!
//! async fn handler(Extension(stamp): Extension<RequestStamp>) -> String {
//!     format!("Request ID: {}", stamp.id)
//! }
//! ```

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Request metadata for tracing and debugging.
#[derive(Clone, Debug)]
pub struct RequestStamp {
    /// Unique request identifier
    pub id: String,
    /// Request timestamp
    pub timestamp: DateTime<Utc>,
}

/// Header carrying the request id in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

impl RequestStamp {
    /// Create a new request stamp with generated ID.
    fn new() -> Self {
        Self::with_id(&Uuid::new_v4().to_string())
    }

    fn with_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            timestamp: lib_utils::now_utc(),
        }
    }
}

/// Request stamping middleware.
///
/// Reuses an incoming `X-Request-ID` when the client sent a usable one,
/// otherwise generates a fresh id. The id is added to:
/// - Request extensions (for handler access)
/// - Response headers (`X-Request-ID`)
pub async fn stamp_req(mut req: Request, next: Next) -> Response {
    let stamp = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= 64)
        .map(RequestStamp::with_id)
        .unwrap_or_else(RequestStamp::new);

    req.extensions_mut().insert(stamp.clone());

    let mut res = next.run(req).await;

    if let Ok(header_value) = HeaderValue::from_str(&stamp.id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, header_value);
    }

    res
}
