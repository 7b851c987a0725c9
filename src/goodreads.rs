//! Goodreads ratings client
//!
//! Fetches community rating counts for a book by ISBN. One GET per call;
//! callers decide what to do when the service is unavailable.

use crate::config::GoodreadsConfig;
use crate::error::AppError;
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument};

/// Community ratings for one book
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Ratings {
    pub isbn: Option<String>,
    pub ratings_count: i64,
    #[serde(default)]
    pub reviews_count: i64,
    #[serde(default)]
    pub text_reviews_count: i64,
    #[serde(deserialize_with = "number_or_string")]
    pub average_rating: f64,
}

#[derive(Debug, Deserialize)]
struct ReviewCountsResponse {
    books: Vec<Ratings>,
}

// The API encodes `average_rating` as a string ("4.05")
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Pick the first book out of a `review_counts.json` body
pub fn parse_review_counts(body: &[u8]) -> Result<Ratings, AppError> {
    let response: ReviewCountsResponse = serde_json::from_slice(body)
        .map_err(|e| AppError::Upstream(format!("Failed to parse ratings response: {}", e)))?;

    response
        .books
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Upstream("Ratings response contained no books".to_string()))
}

/// HTTP client for the review counts endpoint
#[derive(Clone)]
pub struct GoodreadsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoodreadsClient {
    pub fn new(config: &GoodreadsConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bookshelf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Fetch ratings for `isbn`
    #[instrument(skip(self))]
    pub async fn fetch_ratings(&self, isbn: &str) -> Result<Ratings, AppError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str()), ("isbns", isbn)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Ratings API returned {} for {}",
                status, isbn
            )));
        }

        let body = response.bytes().await?;
        let ratings = parse_review_counts(&body)?;
        debug!(ratings_count = ratings.ratings_count, "Fetched ratings");
        Ok(ratings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_average() {
        let body = br#"{"books":[{"id":29207858,"isbn":"1632168146","isbn13":"9781632168146",
            "ratings_count":0,"reviews_count":2,"text_reviews_count":0,
            "work_ratings_count":26,"work_reviews_count":113,
            "work_text_reviews_count":10,"average_rating":"4.04"}]}"#;

        let ratings = parse_review_counts(body).unwrap();
        assert_eq!(ratings.isbn.as_deref(), Some("1632168146"));
        assert_eq!(ratings.ratings_count, 0);
        assert_eq!(ratings.reviews_count, 2);
        assert_eq!(ratings.average_rating, 4.04);
    }

    #[test]
    fn test_parse_numeric_average_and_missing_counts() {
        let body = br#"{"books":[{"ratings_count":12,"average_rating":3.5}]}"#;
        let ratings = parse_review_counts(body).unwrap();
        assert_eq!(ratings.ratings_count, 12);
        assert_eq!(ratings.text_reviews_count, 0);
        assert_eq!(ratings.average_rating, 3.5);
    }

    #[test]
    fn test_empty_or_malformed_responses() {
        assert!(matches!(
            parse_review_counts(br#"{"books":[]}"#),
            Err(AppError::Upstream(_))
        ));
        assert!(matches!(
            parse_review_counts(b"<html>not found</html>"),
            Err(AppError::Upstream(_))
        ));
        assert!(matches!(
            parse_review_counts(br#"{"books":[{"ratings_count":1,"average_rating":"n/a"}]}"#),
            Err(AppError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_upstream_error() {
        let client = GoodreadsClient::new(&GoodreadsConfig {
            api_key: "key".into(),
            base_url: "http://127.0.0.1:1/book/review_counts.json".into(),
            timeout: std::time::Duration::from_secs(1),
        })
        .unwrap();

        assert!(matches!(
            client.fetch_ratings("0441172717").await,
            Err(AppError::Upstream(_))
        ));
    }
}
