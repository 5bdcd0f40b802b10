//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! This module provides the main server setup function that creates the Axum router,
//! registers all routes, applies middleware, and starts the HTTP server.

// region: --- Imports
use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Json, Router,
};
use lib_core::dto::ApiResponse;
use lib_core::{create_pool, run_migrations, Config, DbPool};
use crate::handlers;
use crate::middleware::{log_requests, require_auth, stamp_req, RequestStamp};
use tower_http::cors::CorsLayer;
use tracing::info;
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:3001")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3001".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    /// Read `BIND_ADDRESS` and the comma-separated `ALLOWED_ORIGINS`,
    /// keeping the defaults for whichever is unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_address = lib_utils::get_env_or("BIND_ADDRESS", &defaults.bind_address);
        let allowed_origins = match lib_utils::get_env("ALLOWED_ORIGINS") {
            Ok(raw) => parse_origins(&raw),
            Err(_) => defaults.allowed_origins,
        };

        Self {
            bind_address,
            allowed_origins,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Install the global tracing subscriber.
///
/// `LOG_LEVEL` accepts either a bare level (`debug`) or a full `EnvFilter`
/// directive (`lib_web=debug,sqlx=warn`). Defaults to `info`.
pub fn init_tracing() -> anyhow::Result<()> {
    let log_level = lib_utils::get_env_or("LOG_LEVEL", "info").to_lowercase();
    let filter = tracing_subscriber::EnvFilter::try_new(&log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true) // Show module paths
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global tracing subscriber: {}", e))?;

    info!(" Log level: {}", log_level);
    Ok(())
}

/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - Configuration loading fails
/// - Database connection fails
/// - Database migrations fail
/// - Server binding fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    info!(" MOSAIC CONNECT BACKEND STARTING");

    dotenvy::dotenv().ok();

    info!("Loading configuration...");
    let app_config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    app_config.validate().map_err(|e| anyhow::anyhow!(e))?;

    info!("Database URL: {}", app_config.database_url);

    // Ensure data directory exists for SQLite database
    if let Some(db_path) = app_config.database_url.strip_prefix("sqlite:") {
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!("Created database directory: {:?}", parent);
            }
        }
    }

    info!("Connecting to database...");
    let pool = create_pool(&app_config.database_url).await?;

    info!(" Running database migrations");
    run_migrations(&pool).await?;
    info!(" Migrations complete");

    let state = AppState {
        db: pool,
        config: app_config,
    };

    let app = create_router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;

    info!(" SERVER READY: http://{}", config.bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the main application router with all routes
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::HeaderName::from_static(
            crate::middleware::mw_req_stamp::REQUEST_ID_HEADER,
        )]);

    info!("[ROUTE SETUP] Registering HTTP routes...");

    let protected = Router::new()
        .route("/api/users/me", get(handlers::users::me))
        .route("/api/users/search", get(handlers::users::search))
        .route(
            "/api/conversations",
            get(handlers::conversations::list_conversations).post(handlers::conversations::create_conversation),
        )
        .route("/api/conversations/{id}", get(handlers::conversations::get_conversation))
        .route("/api/conversations/{id}/mute", put(handlers::conversations::mute_conversation))
        .route(
            "/api/conversations/{id}/messages",
            get(handlers::messages::list_messages).post(handlers::messages::send_message),
        )
        .route(
            "/api/conversations/{id}/messages/{message_id}",
            get(handlers::messages::get_message)
                .put(handlers::messages::edit_message)
                .delete(handlers::messages::delete_message),
        )
        .route(
            "/api/conversations/{id}/messages/{message_id}/read",
            put(handlers::messages::mark_message_read),
        )
        .route(
            "/api/notifications",
            get(handlers::notifications::list_notifications).post(handlers::notifications::create_notification),
        )
        .route("/api/notifications/unread-count", get(handlers::notifications::unread_count))
        .route("/api/notifications/read-all", put(handlers::notifications::mark_all_read))
        .route("/api/notifications/{id}/read", put(handlers::notifications::mark_read))
        .route("/api/notifications/{id}", axum::routing::delete(handlers::notifications::delete_notification))
        .route("/api/friends", get(handlers::friends::get_friends))
        .route("/api/friends/{user_id}/send-request", post(handlers::friends::send_request))
        .route("/api/friends/{user_id}/cancel-request", post(handlers::friends::cancel_request))
        .route("/api/friends/{user_id}/accept-request", post(handlers::friends::accept_request))
        .route("/api/friends/{user_id}/reject-request", post(handlers::friends::reject_request))
        .route("/api/friends/{user_id}/unfriend", post(handlers::friends::unfriend))
        .route("/api/settings", put(handlers::settings::update_settings))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/settings", get(handlers::settings::get_settings))
        .route("/health", get(|| async { "OK" }))
        .merge(protected)
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            (StatusCode::NOT_FOUND, Json(ApiResponse::<()>::failure("Route not found")))
        })
        .with_state(state)
        // Layers run bottom-up: CORS, then stamping, then tracing, then logging
        .layer(from_fn(log_requests))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                    )
                })
                .on_failure(|error: tower_http::classify::ServerErrorsFailureClass, latency: std::time::Duration, _span: &tracing::Span| {
                    tracing::error!(
                        error = ?error,
                        latency_ms = latency.as_millis(),
                        "[HTTP FAILURE] Error: {:?}, Latency: {}ms",
                        error,
                        latency.as_millis()
                    );
                }),
        )
        .layer(from_fn(stamp_req))
        .layer(cors)
}

/// Log server information
fn log_server_info() {
    info!(" AUTH:");
    info!("   • POST /api/auth/signup");
    info!("   • POST /api/auth/login");
    info!(" USERS:");
    info!("   • GET  /api/users/me");
    info!("   • GET  /api/users/search?query={{username}}");
    info!(" CONVERSATIONS:");
    info!("   • GET  /api/conversations");
    info!("   • POST /api/conversations");
    info!("   • GET  /api/conversations/{{id}}");
    info!("   • PUT  /api/conversations/{{id}}/mute");
    info!(" MESSAGES:");
    info!("   • GET  /api/conversations/{{id}}/messages");
    info!("   • POST /api/conversations/{{id}}/messages");
    info!("   • GET|PUT|DELETE /api/conversations/{{id}}/messages/{{message_id}}");
    info!("   • PUT  /api/conversations/{{id}}/messages/{{message_id}}/read");
    info!(" NOTIFICATIONS:");
    info!("   • GET  /api/notifications");
    info!("   • POST /api/notifications");
    info!("   • GET  /api/notifications/unread-count");
    info!("   • PUT  /api/notifications/read-all");
    info!("   • PUT  /api/notifications/{{id}}/read");
    info!("   • DELETE /api/notifications/{{id}}");
    info!(" FRIENDS:");
    info!("   • GET  /api/friends");
    info!("   • POST /api/friends/{{user_id}}/send-request|cancel-request|accept-request|reject-request|unfriend");
    info!(" SETTINGS:");
    info!("   • GET  /api/settings");
    info!("   • PUT  /api/settings (admin)");
    info!(" HEALTH:");
    info!("   • GET  /health");
}
// endregion: --- Server Setup

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{call, setup_test_db, test_app};

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[tokio::test]
    async fn test_health_and_fallback() {
        let app = test_app(setup_test_db().await);

        let (status, _) = call(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, "GET", "/api/nothing-here", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Route not found");
    }

    #[tokio::test]
    async fn test_protected_routes_fail_closed() {
        let app = test_app(setup_test_db().await);

        for (method, uri) in [
            ("GET", "/api/users/me"),
            ("GET", "/api/conversations"),
            ("GET", "/api/notifications"),
            ("GET", "/api/friends"),
            ("PUT", "/api/settings"),
        ] {
            let (status, body) = call(&app, method, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["success"], false);
        }

        let (status, body) = call(&app, "GET", "/api/users/me", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid or expired token");
    }
}
