//! Storage traits used by the request handlers
//!
//! The PostgreSQL services in [`super::service`] implement these; handlers
//! only see the traits through [`crate::state::AppState`].

use crate::error::AppError;
use crate::models::{Book, BookSearch, NewReview, Review, ReviewStats, User};
use async_trait::async_trait;

/// Registered accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Insert a user; a taken username is [`AppError::Conflict`]
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError>;
}

/// Read-only book catalog
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, AppError>;

    /// At most ten books matching any of the present fields
    async fn search(&self, search: &BookSearch) -> Result<Vec<Book>, AppError>;
}

/// Reviews, at most one per user and book
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn has_reviewed(&self, user_id: i32, isbn: &str) -> Result<bool, AppError>;

    /// Insert a review; a second review of the same book is [`AppError::Conflict`]
    async fn create(&self, user_id: i32, isbn: &str, review: &NewReview) -> Result<(), AppError>;

    /// Newest first
    async fn list_for_book(&self, isbn: &str) -> Result<Vec<Review>, AppError>;

    async fn stats_for_book(&self, isbn: &str) -> Result<Option<ReviewStats>, AppError>;
}
