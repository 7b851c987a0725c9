//! Router fixtures shared by the handler tests

use super::create_router;
use crate::config::{DatabaseConfig, GoodreadsConfig, ServerConfig, SessionConfig, Settings};
use crate::db::create_pool;
use crate::db::memory::{MemoryBooks, MemoryReviews, MemoryUsers};
use crate::goodreads::GoodreadsClient;
use crate::models::Book;
use crate::state::AppState;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

pub const DUNE: &str = "0441172717";
pub const USERNAME: &str = "ada";
pub const PASSWORD: &str = "lovelace";

// Nothing listens on port 1, so database and ratings calls fail fast
fn settings() -> Settings {
    Settings {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            host: "127.0.0.1".into(),
            port: 1,
            ..Default::default()
        },
        goodreads: GoodreadsConfig {
            api_key: "test".into(),
            base_url: "http://127.0.0.1:1/book/review_counts.json".into(),
            timeout: Duration::from_secs(1),
        },
        session: SessionConfig::default(),
    }
}

/// Router over an unreachable PostgreSQL
pub fn offline_app() -> Router {
    let settings = settings();
    let pool = create_pool(&settings.database).unwrap();
    let goodreads = GoodreadsClient::new(&settings.goodreads).unwrap();
    create_router(
        Arc::new(AppState::new(pool, goodreads)),
        &settings,
        MemoryStore::default(),
    )
}

/// Router over in-memory stores holding one book and one account
pub struct FakeApp {
    pub app: Router,
    pub users: Arc<MemoryUsers>,
    pub reviews: Arc<MemoryReviews>,
}

impl FakeApp {
    pub fn new() -> Self {
        let settings = settings();
        let users = Arc::new(MemoryUsers::default().with_user(USERNAME, PASSWORD));
        let reviews = Arc::new(MemoryReviews::default());
        let books = Arc::new(MemoryBooks::new(vec![Book {
            isbn: DUNE.to_string(),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            year: 1965,
        }]));

        let state = AppState::with_stores(
            users.clone(),
            books,
            reviews.clone(),
            GoodreadsClient::new(&settings.goodreads).unwrap(),
        );
        let app = create_router(Arc::new(state), &settings, MemoryStore::default());

        Self {
            app,
            users,
            reviews,
        }
    }

    /// Log in as the stored account and return its session cookie
    pub async fn log_in(&self) -> String {
        let body = format!("username={}&password={}", USERNAME, PASSWORD);
        let response = self
            .app
            .clone()
            .oneshot(post_form("/login", &body))
            .await
            .unwrap();
        assert_eq!(location(&response), "/search");
        session_cookie(&response)
    }

    /// GET `uri` with `cookie` and return the page body
    pub async fn page(&self, uri: &str, cookie: &str) -> String {
        let response = self
            .app
            .clone()
            .oneshot(with_cookie(get(uri), cookie))
            .await
            .unwrap();
        body_text(response).await
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

pub fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub fn session_cookie(response: &Response) -> String {
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
