//! Reviews and aggregate review statistics

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio_postgres::Row;

/// Rating assigned when the star field is left blank
pub const DEFAULT_RATING: i32 = 5;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// A review as shown on the book page
#[derive(Debug, Clone)]
pub struct Review {
    pub username: String,
    pub rating: i32,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Row> for Review {
    fn from(row: &Row) -> Self {
        Self {
            username: row.get("username"),
            rating: row.get("rating"),
            text: row.get::<_, Option<String>>("text_review").unwrap_or_default(),
            created_at: row.get("created_at"),
        }
    }
}

/// Review count and mean rating for one book
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewStats {
    pub review_count: i64,
    pub average_score: f64,
}

impl ReviewStats {
    /// `None` when the book has no reviews
    pub fn from_aggregate(count: i64, average: Option<f64>) -> Option<Self> {
        match (count, average) {
            (n, Some(avg)) if n > 0 => Some(Self {
                review_count: n,
                average_score: (avg * 100.0).round() / 100.0,
            }),
            _ => None,
        }
    }
}

/// Form body posted to `/book/{isbn}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewForm {
    pub review_star: Option<String>,
    pub review_text: Option<String>,
}

/// A review ready to be stored
#[derive(Debug, PartialEq, Eq)]
pub struct NewReview {
    pub rating: i32,
    pub text: Option<String>,
}

impl ReviewForm {
    /// A form without either review field is a plain page view
    pub fn is_submission(&self) -> bool {
        self.review_star.is_some() || self.review_text.is_some()
    }

    pub fn into_review(self) -> Result<NewReview, AppError> {
        Ok(NewReview {
            rating: parse_rating(self.review_star.as_deref())?,
            text: super::non_blank(self.review_text),
        })
    }
}

/// Parse the star rating; blank defaults to [`DEFAULT_RATING`]
pub fn parse_rating(raw: Option<&str>) -> Result<i32, AppError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Ok(DEFAULT_RATING);
    }

    let rating: i32 = raw
        .parse()
        .map_err(|_| AppError::Validation("Rating must be a whole number.".to_string()))?;

    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::Validation(format!(
            "Rating must be between {} and {}.",
            MIN_RATING, MAX_RATING
        )));
    }

    Ok(rating)
}
