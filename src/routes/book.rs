//! Book page handlers
//!
//! Shows catalog details, Goodreads ratings and local reviews, and accepts
//! one review per user and book.

use crate::auth;
use crate::error::{AppError, AppResult};
use crate::flash::{flash, flash_redirect};
use crate::models::{Book, ReviewForm};
use crate::state::SharedState;
use crate::templates::{render, BookTemplate, PageContext};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form,
};
use tower_sessions::Session;
use tracing::{info, warn};

const ALREADY_REVIEWED: &str = "You have already submitted a comment for that book!";

/// GET /book/{isbn}
pub async fn show_book(
    State(state): State<SharedState>,
    session: Session,
    Path(isbn): Path<String>,
) -> AppResult<Response> {
    let Some(book) = state.books.find_by_isbn(&isbn).await? else {
        return flash_redirect(&session, "No such book.", "/search").await;
    };

    render_book(&state, &session, book).await
}

/// POST /book/{isbn}
///
/// Without review fields this behaves like GET. With them, the logged-in
/// user's review is stored before the page is rendered.
pub async fn review_book(
    State(state): State<SharedState>,
    session: Session,
    Path(isbn): Path<String>,
    Form(form): Form<ReviewForm>,
) -> AppResult<Response> {
    let Some(book) = state.books.find_by_isbn(&isbn).await? else {
        return flash_redirect(&session, "No such book.", "/search").await;
    };

    if !form.is_submission() {
        return render_book(&state, &session, book).await;
    }

    let Some(user) = auth::current_user(&session).await? else {
        return flash_redirect(&session, "You have to log in to submit a review.", "/login").await;
    };

    let review = match form.into_review() {
        Ok(review) => review,
        Err(AppError::Validation(message)) => {
            return flash_redirect(&session, message, &format!("/book/{}", book.isbn)).await
        }
        Err(e) => return Err(e),
    };

    if state.reviews.has_reviewed(user.id, &book.isbn).await? {
        return flash_redirect(&session, ALREADY_REVIEWED, "/search").await;
    }

    match state.reviews.create(user.id, &book.isbn, &review).await {
        Ok(()) => {}
        Err(AppError::Conflict(_)) => {
            return flash_redirect(&session, ALREADY_REVIEWED, "/search").await
        }
        Err(e) => return Err(e),
    }

    info!(user_id = user.id, isbn = %book.isbn, rating = review.rating, "Review submitted");
    flash(&session, "Submitted your comment!").await?;

    render_book(&state, &session, book).await
}

async fn render_book(state: &SharedState, session: &Session, book: Book) -> AppResult<Response> {
    let user = auth::current_user(session).await?;

    let (ratings, reviews, stats) = tokio::join!(
        state.goodreads.fetch_ratings(&book.isbn),
        state.reviews.list_for_book(&book.isbn),
        state.reviews.stats_for_book(&book.isbn),
    );

    // Ratings are decoration; the page renders without them
    let ratings = match ratings {
        Ok(ratings) => Some(ratings),
        Err(e) => {
            warn!(isbn = %book.isbn, error = %e, "Goodreads ratings unavailable");
            None
        }
    };

    let (reviews, stats) = (reviews?, stats?);
    let has_reviewed = match &user {
        Some(user) => state.reviews.has_reviewed(user.id, &book.isbn).await?,
        None => false,
    };

    // Flashes are drained only once nothing else can fail
    let ctx = PageContext::load(session).await?;

    Ok(render(BookTemplate {
        ctx,
        book,
        ratings,
        reviews,
        stats,
        has_reviewed,
    })?
    .into_response())
}
