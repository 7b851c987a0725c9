//! Catalog search handlers (login required)

use crate::auth::CurrentUser;
use crate::error::AppResult;
use crate::flash::flash_redirect;
use crate::models::{BookSearch, SearchForm};
use crate::state::SharedState;
use crate::templates::{render, PageContext, SearchTemplate};
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Extension, Form,
};
use tower_sessions::Session;
use tracing::debug;

/// GET /search
pub async fn search_page(session: Session) -> AppResult<Html<String>> {
    render(SearchTemplate {
        ctx: PageContext::load(&session).await?,
        results: Vec::new(),
    })
}

/// POST /search
///
/// Matches any of ISBN, title or author as a case-insensitive substring.
pub async fn search_books(
    State(state): State<SharedState>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
    Form(form): Form<SearchForm>,
) -> AppResult<Response> {
    let search = BookSearch::from(form);
    if search.is_empty() {
        return flash_redirect(&session, "You should provide at least 1 field.", "/search").await;
    }

    let results = state.books.search(&search).await?;
    debug!(user_id = user.id, matches = results.len(), "Search finished");

    if results.is_empty() {
        return flash_redirect(&session, "No match. Please search again.", "/search").await;
    }

    Ok(render(SearchTemplate {
        ctx: PageContext::load(&session).await?,
        results,
    })?
    .into_response())
}
