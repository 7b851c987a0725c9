//! Bookshelf - book review web application
//!
//! Users register, log in, search the book catalog by ISBN, title or author,
//! read Goodreads ratings next to local reviews, and leave one review per book.
//! Book details and review statistics are also served as JSON at `/api/{isbn}`.

mod auth;
mod config;
mod db;
mod error;
mod flash;
mod goodreads;
mod models;
mod routes;
mod state;
mod templates;

use crate::config::Settings;
use crate::db::{purge_expired_sessions, PgSessionStore};
use crate::goodreads::GoodreadsClient;
use crate::routes::create_router;
use crate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting Bookshelf...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    // Database is required; fail fast if it is unreachable
    let pool = db::create_pool(&settings.database)?;
    db::verify_connection(&pool).await?;
    info!(
        "✅ Database connection successful (TLS: {})",
        settings.database.use_tls
    );
    db::init_schema(&pool).await?;

    // Sessions live in PostgreSQL; expired rows are purged in the background
    let sessions = PgSessionStore::new(pool.clone());
    tokio::spawn(purge_expired_sessions(
        sessions.clone(),
        settings.session.purge_interval,
    ));
    info!(
        "🧹 Purging expired sessions every {:?}",
        settings.session.purge_interval
    );

    let goodreads = GoodreadsClient::new(&settings.goodreads)?;
    let state = Arc::new(AppState::new(pool, goodreads));

    // Build the router
    let app = create_router(state, &settings, sessions);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("📚 Routes:");
    info!("   GET       /                - Home");
    info!("   GET|POST  /register        - Create an account");
    info!("   GET|POST  /login           - Log in");
    info!("   GET       /logout          - Log out");
    info!("   GET|POST  /search          - Search books (login required)");
    info!("   GET|POST  /book/{{isbn}}     - Book details and reviews");
    info!("   GET       /developer       - API documentation");
    info!("   GET       /api/{{isbn}}      - Book details as JSON");
    info!("   GET       /health          - Health check");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bookshelf=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
