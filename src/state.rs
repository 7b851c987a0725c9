//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::db::{BookService, BookStore, ReviewService, ReviewStore, UserService, UserStore};
use crate::goodreads::GoodreadsClient;
use deadpool_postgres::Pool;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Accounts for registration and login
    pub users: Arc<dyn UserStore>,

    /// Book catalog lookups and search
    pub books: Arc<dyn BookStore>,

    /// Review storage and statistics
    pub reviews: Arc<dyn ReviewStore>,

    /// External ratings API
    pub goodreads: GoodreadsClient,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn new(pool: Pool, goodreads: GoodreadsClient) -> Self {
        Self::with_stores(
            Arc::new(UserService::new(pool.clone())),
            Arc::new(BookService::new(pool.clone())),
            Arc::new(ReviewService::new(pool)),
            goodreads,
        )
    }

    pub fn with_stores(
        users: Arc<dyn UserStore>,
        books: Arc<dyn BookStore>,
        reviews: Arc<dyn ReviewStore>,
        goodreads: GoodreadsClient,
    ) -> Self {
        Self {
            users,
            books,
            reviews,
            goodreads,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
