//! Book records and catalog search

use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use super::ReviewStats;

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl From<&Row> for Book {
    fn from(row: &Row) -> Self {
        Self {
            isbn: row.get("isbn"),
            title: row.get("title"),
            author: row.get("author"),
            year: row.get("year"),
        }
    }
}

/// Raw `/search` form body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchForm {
    pub isbn_query: Option<String>,
    pub title_query: Option<String>,
    pub author_query: Option<String>,
}

/// Search criteria; a book matches if any present field matches
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BookSearch {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// ILIKE patterns ready to bind; `None` binds as NULL
#[derive(Debug, PartialEq, Eq)]
pub struct SearchPatterns {
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
}

impl From<SearchForm> for BookSearch {
    fn from(form: SearchForm) -> Self {
        Self {
            isbn: super::non_blank(form.isbn_query),
            title: super::non_blank(form.title_query),
            author: super::non_blank(form.author_query),
        }
    }
}

impl BookSearch {
    pub fn is_empty(&self) -> bool {
        self.isbn.is_none() && self.title.is_none() && self.author.is_none()
    }

    /// Substring patterns with user-supplied wildcards matched literally
    pub fn patterns(&self) -> SearchPatterns {
        let contains = |term: &Option<String>| {
            term.as_deref()
                .map(|t| format!("%{}%", escape_like(t)))
        };
        SearchPatterns {
            isbn: contains(&self.isbn),
            title: contains(&self.title),
            author: contains(&self.author),
        }
    }
}

/// Escape `%`, `_` and the backslash escape character itself
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Body of `GET /api/{isbn}`
#[derive(Debug, Serialize)]
pub struct BookApiResponse {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
}

impl BookApiResponse {
    pub fn new(book: Book, stats: Option<ReviewStats>) -> Self {
        Self {
            isbn: book.isbn,
            title: book.title,
            author: book.author,
            year: book.year,
            review_count: stats.as_ref().map(|s| s.review_count),
            average_score: stats.map(|s| s.average_score),
        }
    }
}
