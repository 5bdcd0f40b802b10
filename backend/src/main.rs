//! # Backend Service
//!
//! Thin entry point that delegates to lib-web for server setup.
//!
//! Environment (a `.env` file is honoured):
//! - `DATABASE_URL`, `JWT_SECRET`, `JWT_EXPIRATION_HOURS` - see `lib_core::Config`
//! - `BIND_ADDRESS`, `ALLOWED_ORIGINS` - see `lib_web::ServerConfig`
//! - `LOG_LEVEL` - tracing filter, defaults to `info`

use lib_web::{init_tracing, start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    init_tracing()?;

    start_server(ServerConfig::from_env()).await
}
