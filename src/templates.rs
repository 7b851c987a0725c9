//! HTML pages
//!
//! Askama templates live in `templates/`; every page extends `layout.html`.

use crate::auth::{self, CurrentUser};
use crate::error::AppResult;
use crate::flash::take_flashes;
use crate::goodreads::Ratings;
use crate::models::{Book, Review, ReviewStats, MAX_RATING, MIN_RATING};
use askama::Template;
use axum::response::Html;
use tower_sessions::Session;

/// Data every page needs: pending flashes and who is logged in
pub struct PageContext {
    pub flashes: Vec<String>,
    pub user: Option<CurrentUser>,
}

impl PageContext {
    /// Drains the flash queue, so call it once per rendered page
    pub async fn load(session: &Session) -> AppResult<Self> {
        Ok(Self {
            flashes: take_flashes(session).await?,
            user: auth::current_user(session).await?,
        })
    }

    pub fn logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn username(&self) -> &str {
        self.user.as_ref().map(|u| u.username.as_str()).unwrap_or("")
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
}

#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub ctx: PageContext,
    pub results: Vec<Book>,
}

#[derive(Template)]
#[template(path = "book.html")]
pub struct BookTemplate {
    pub ctx: PageContext,
    pub book: Book,
    pub ratings: Option<Ratings>,
    pub reviews: Vec<Review>,
    pub stats: Option<ReviewStats>,
    pub has_reviewed: bool,
}

impl BookTemplate {
    pub fn rating_choices(&self) -> Vec<i32> {
        (MIN_RATING..=MAX_RATING).rev().collect()
    }
}

#[derive(Template)]
#[template(path = "developer.html")]
pub struct DeveloperTemplate {
    pub ctx: PageContext,
}

/// Render a template into an HTML response
pub fn render<T: Template>(template: T) -> AppResult<Html<String>> {
    Ok(Html(template.render()?))
}
