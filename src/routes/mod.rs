//! Route definitions and router setup
//!
//! Configures all routes and middleware.

mod api;
mod auth;
mod book;
mod pages;
mod search;
#[cfg(test)]
mod test_support;

use crate::auth::require_login;
use crate::config::Settings;
use crate::state::SharedState;
use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router<Store>(state: SharedState, settings: &Settings, store: Store) -> Router
where
    Store: SessionStore + Clone,
{
    // Session setup
    let session_layer = SessionManagerLayer::new(store)
        .with_secure(settings.session.secure)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            settings.session.ttl_hours,
        )));

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let middleware_stack = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .propagate_x_request_id();

    // Routes that need a logged-in user
    let protected = Router::new()
        .route("/search", get(search::search_page).post(search::search_books))
        .route_layer(middleware::from_fn(require_login));

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Pages
        .route("/", get(pages::index))
        .route("/developer", get(pages::developer))

        // Accounts
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))

        // Books
        .route("/book/{isbn}", get(book::show_book).post(book::review_book))
        .route("/api/{isbn}", get(api::book_api))

        .merge(protected)

        // Apply middleware and state
        .layer(session_layer)
        .layer(middleware_stack)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
