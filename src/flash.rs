//! One-shot user notifications
//!
//! Messages are queued in the session and drained by the next rendered page.

use crate::error::AppError;
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

const FLASH_KEY: &str = "_flashes";

/// Queue a message for the next rendered page
pub async fn flash(session: &Session, message: impl Into<String>) -> Result<(), AppError> {
    let mut messages: Vec<String> = session.get(FLASH_KEY).await?.unwrap_or_default();
    messages.push(message.into());
    session.insert(FLASH_KEY, messages).await?;
    Ok(())
}

/// Return all queued messages and clear the queue
pub async fn take_flashes(session: &Session) -> Result<Vec<String>, AppError> {
    Ok(session
        .remove::<Vec<String>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}

/// Flash `message` and redirect to `to`
pub async fn flash_redirect(
    session: &Session,
    message: impl Into<String>,
    to: &str,
) -> Result<Response, AppError> {
    flash(session, message).await?;
    Ok(Redirect::to(to).into_response())
}
