//! Authentication middleware
//!
//! Guards routes that need a logged-in user.

use super::{current_user, CurrentUser};
use crate::error::AppError;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

/// Redirect anonymous visitors to `/login`.
///
/// On success the [`CurrentUser`] is available to handlers as an `Extension`.
pub async fn require_login(
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(user) = current_user(&session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    request.extensions_mut().insert::<CurrentUser>(user);
    Ok(next.run(request).await)
}
