//! Static page handlers

use crate::error::AppResult;
use crate::templates::{render, DeveloperTemplate, IndexTemplate, PageContext};
use axum::response::Html;
use tower_sessions::Session;

/// GET /
pub async fn index(session: Session) -> AppResult<Html<String>> {
    render(IndexTemplate {
        ctx: PageContext::load(&session).await?,
    })
}

/// GET /developer
///
/// Documents the JSON API.
pub async fn developer(session: Session) -> AppResult<Html<String>> {
    render(DeveloperTemplate {
        ctx: PageContext::load(&session).await?,
    })
}
