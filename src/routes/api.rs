//! JSON API handlers

use crate::error::{AppError, AppResult};
use crate::models::BookApiResponse;
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    Json,
};

/// GET /api/{isbn}
///
/// Book details plus review statistics. The statistics fields are omitted
/// when nobody has reviewed the book yet.
pub async fn book_api(
    State(state): State<SharedState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookApiResponse>> {
    let book = state
        .books
        .find_by_isbn(&isbn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No book with ISBN {}", isbn)))?;

    let stats = state.reviews.stats_for_book(&book.isbn).await?;

    Ok(Json(BookApiResponse::new(book, stats)))
}
