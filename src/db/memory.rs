//! In-memory stores for driving the handlers without PostgreSQL

use super::store::{BookStore, ReviewStore, UserStore};
use crate::error::AppError;
use crate::models::{Book, BookSearch, NewReview, Review, ReviewStats, User};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryUsers {
    users: Mutex<Vec<User>>,
    /// Lookups miss, as if another request registered the name in between
    pub hide_from_lookup: AtomicBool,
}

impl MemoryUsers {
    /// Add an account; bcrypt cost 4 keeps this fast
    pub fn with_user(self, username: &str, password: &str) -> Self {
        let hash = bcrypt::hash(password, 4).unwrap();
        {
            let mut users = self.users.lock().unwrap();
            let id = users.len() as i32 + 1;
            users.push(User {
                id,
                username: username.to_string(),
                password_hash: hash,
            });
        }
        self
    }
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        if self.hide_from_lookup.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict("This username exists.".to_string()));
        }
        let user = User {
            id: users.len() as i32 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

pub struct MemoryBooks {
    books: Vec<Book>,
}

impl MemoryBooks {
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }
}

#[async_trait]
impl BookStore for MemoryBooks {
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, AppError> {
        Ok(self.books.iter().find(|b| b.isbn == isbn).cloned())
    }

    async fn search(&self, search: &BookSearch) -> Result<Vec<Book>, AppError> {
        let contains = |field: &str, term: &Option<String>| {
            term.as_deref()
                .is_some_and(|t| field.to_lowercase().contains(&t.to_lowercase()))
        };
        Ok(self
            .books
            .iter()
            .filter(|b| {
                contains(&b.isbn, &search.isbn)
                    || contains(&b.title, &search.title)
                    || contains(&b.author, &search.author)
            })
            .take(10)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryReviews {
    reviews: Mutex<Vec<(i32, String, Review)>>,
    /// `has_reviewed` always answers false, as if two submissions raced
    pub skip_check: AtomicBool,
    /// Listing and statistics fail
    pub fail_reads: AtomicBool,
}

impl MemoryReviews {
    fn check_reads(&self) -> Result<(), AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Internal("review reads unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for MemoryReviews {
    async fn has_reviewed(&self, user_id: i32, isbn: &str) -> Result<bool, AppError> {
        if self.skip_check.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let reviews = self.reviews.lock().unwrap();
        Ok(reviews.iter().any(|(uid, i, _)| *uid == user_id && i == isbn))
    }

    async fn create(&self, user_id: i32, isbn: &str, review: &NewReview) -> Result<(), AppError> {
        let mut reviews = self.reviews.lock().unwrap();
        if reviews.iter().any(|(uid, i, _)| *uid == user_id && i == isbn) {
            return Err(AppError::Conflict(
                "You have already submitted a comment for that book!".to_string(),
            ));
        }
        reviews.push((
            user_id,
            isbn.to_string(),
            Review {
                username: format!("user{}", user_id),
                rating: review.rating,
                text: review.text.clone().unwrap_or_default(),
                created_at: chrono::Utc::now(),
            },
        ));
        Ok(())
    }

    async fn list_for_book(&self, isbn: &str) -> Result<Vec<Review>, AppError> {
        self.check_reads()?;
        let reviews = self.reviews.lock().unwrap();
        Ok(reviews
            .iter()
            .rev()
            .filter(|(_, i, _)| i == isbn)
            .map(|(_, _, r)| r.clone())
            .collect())
    }

    async fn stats_for_book(&self, isbn: &str) -> Result<Option<ReviewStats>, AppError> {
        self.check_reads()?;
        let reviews = self.reviews.lock().unwrap();
        let ratings: Vec<i32> = reviews
            .iter()
            .filter(|(_, i, _)| i == isbn)
            .map(|(_, _, r)| r.rating)
            .collect();
        let average = (!ratings.is_empty())
            .then(|| ratings.iter().sum::<i32>() as f64 / ratings.len() as f64);
        Ok(ReviewStats::from_aggregate(ratings.len() as i64, average))
    }
}
