// Database services for users, books and reviews
//
// Each service borrows a pooled client per call.

use super::queries;
use super::store::{BookStore, ReviewStore, UserStore};
use crate::error::AppError;
use crate::models::{Book, BookSearch, NewReview, Review, ReviewStats, User};
use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;
use tracing::debug;

fn is_unique_violation(code: Option<&SqlState>) -> bool {
    code == Some(&SqlState::UNIQUE_VIOLATION)
}

// Map a unique-constraint violation to a conflict, anything else passes through
fn conflict_on_unique(e: tokio_postgres::Error, message: &str) -> AppError {
    if is_unique_violation(e.code()) {
        AppError::Conflict(message.to_string())
    } else {
        AppError::Database(e)
    }
}

// User service for database operations
#[derive(Clone)]
pub struct UserService {
    pool: Pool,
}

impl UserService {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserService {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(queries::FIND_USER_BY_USERNAME, &[&username])
            .await?;
        Ok(row.as_ref().map(User::from))
    }

    // `password_hash` must already be hashed
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(queries::INSERT_USER, &[&username, &password_hash])
            .await
            .map_err(|e| conflict_on_unique(e, "This username exists."))?;
        Ok(User::from(&row))
    }
}

// Book service for catalog lookups
#[derive(Clone)]
pub struct BookService {
    pool: Pool,
}

impl BookService {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BookService {
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(queries::FIND_BOOK_BY_ISBN, &[&isbn]).await?;
        Ok(row.as_ref().map(Book::from))
    }

    async fn search(&self, search: &BookSearch) -> Result<Vec<Book>, AppError> {
        let patterns = search.patterns();
        debug!(?patterns, "Searching books");

        let client = self.pool.get().await?;
        let rows = client
            .query(
                queries::SEARCH_BOOKS,
                &[&patterns.isbn, &patterns.author, &patterns.title],
            )
            .await?;
        Ok(rows.iter().map(Book::from).collect())
    }
}

// Review service for reading and writing reviews
#[derive(Clone)]
pub struct ReviewService {
    pool: Pool,
}

impl ReviewService {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for ReviewService {
    async fn has_reviewed(&self, user_id: i32, isbn: &str) -> Result<bool, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(queries::USER_HAS_REVIEWED, &[&user_id, &isbn])
            .await?;
        Ok(row.get(0))
    }

    // The (user_id, isbn) constraint catches a concurrent duplicate
    async fn create(&self, user_id: i32, isbn: &str, review: &NewReview) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        client
            .execute(
                queries::INSERT_REVIEW,
                &[&isbn, &user_id, &review.rating, &review.text],
            )
            .await
            .map_err(|e| {
                conflict_on_unique(e, "You have already submitted a comment for that book!")
            })?;
        Ok(())
    }

    async fn list_for_book(&self, isbn: &str) -> Result<Vec<Review>, AppError> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::LIST_REVIEWS_FOR_BOOK, &[&isbn]).await?;
        Ok(rows.iter().map(Review::from).collect())
    }

    async fn stats_for_book(&self, isbn: &str) -> Result<Option<ReviewStats>, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_one(queries::REVIEW_STATS_FOR_BOOK, &[&isbn]).await?;
        Ok(ReviewStats::from_aggregate(
            row.get("review_count"),
            row.get("average_score"),
        ))
    }
}
