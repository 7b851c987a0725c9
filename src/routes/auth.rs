//! Account route handlers
//!
//! Registration, login and logout. Every user mistake is flashed and
//! redirected back to the form it came from.

use crate::auth::{self, hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::flash::flash_redirect;
use crate::models::CredentialsForm;
use crate::state::SharedState;
use crate::templates::{render, LoginTemplate, PageContext, RegisterTemplate};
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
    Form,
};
use tower_sessions::Session;
use tracing::info;

// bcrypt is deliberately slow; keep it off the async workers
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Password task failed: {}", e)))?
}

/// GET /register
pub async fn register_page(session: Session) -> AppResult<Html<String>> {
    render(RegisterTemplate {
        ctx: PageContext::load(&session).await?,
    })
}

/// POST /register
pub async fn register(
    State(state): State<SharedState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Response> {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(message) => return flash_redirect(&session, message, "/register").await,
    };

    if state
        .users
        .find_by_username(&credentials.username)
        .await?
        .is_some()
    {
        return flash_redirect(&session, "This username exists.", "/register").await;
    }

    let password = credentials.password;
    let password_hash = blocking(move || hash_password(&password)).await?;

    let user = match state.users.create(&credentials.username, &password_hash).await {
        Ok(user) => user,
        Err(AppError::Conflict(message)) => {
            return flash_redirect(&session, message, "/register").await
        }
        Err(e) => return Err(e),
    };

    info!(user_id = user.id, username = %user.username, "User registered");
    flash_redirect(&session, "Successfully registered.", "/login").await
}

/// GET /login
pub async fn login_page(session: Session) -> AppResult<Html<String>> {
    render(LoginTemplate {
        ctx: PageContext::load(&session).await?,
    })
}

/// POST /login
pub async fn login(
    State(state): State<SharedState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> AppResult<Response> {
    // Forget any previous user
    auth::log_out(&session).await;

    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(message) => return flash_redirect(&session, message, "/login").await,
    };

    let Some(user) = state.users.find_by_username(&credentials.username).await? else {
        return flash_redirect(&session, "No such username.", "/login").await;
    };

    let password = credentials.password;
    let password_hash = user.password_hash.clone();
    if !blocking(move || verify_password(&password, &password_hash)).await? {
        return flash_redirect(&session, "Wrong password.", "/login").await;
    }

    auth::log_in(&session, &user).await?;
    info!(user_id = user.id, "User logged in");
    flash_redirect(&session, "Successfully logged in!", "/search").await
}

/// GET /logout
pub async fn logout(session: Session) -> AppResult<impl IntoResponse> {
    auth::log_out(&session).await;
    flash_redirect(&session, "Successfully logged out!", "/").await
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_register_validation_flashes_once() {
        let app = offline_app();

        let response = app
            .clone()
            .oneshot(post_form("/register", "username=&password=secret"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/register");
        let cookie = session_cookie(&response);

        let follow = || with_cookie(get("/register"), &cookie);

        let page = body_text(app.clone().oneshot(follow()).await.unwrap()).await;
        assert!(page.contains("You must provide a username."));

        let page = body_text(app.oneshot(follow()).await.unwrap()).await;
        assert!(!page.contains("You must provide a username."));
    }

    #[tokio::test]
    async fn test_login_requires_password() {
        let response = offline_app()
            .oneshot(post_form("/login", "username=ada"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_register_then_log_in() {
        let fake = FakeApp::new();

        let response = fake
            .app
            .clone()
            .oneshot(post_form("/register", "username=grace&password=hopper"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/login");
        let cookie = session_cookie(&response);
        assert!(fake.page("/login", &cookie).await.contains("Successfully registered."));

        let response = fake
            .app
            .clone()
            .oneshot(post_form("/login", "username=grace&password=hopper"))
            .await
            .unwrap();
        assert_eq!(location(&response), "/search");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let fake = FakeApp::new();
        let body = format!("username={}&password=other", USERNAME);

        let response = fake
            .app
            .clone()
            .oneshot(post_form("/register", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/register");

        let page = fake.page("/register", &session_cookie(&response)).await;
        assert!(page.contains("This username exists."));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_username_is_rejected() {
        let fake = FakeApp::new();
        // The lookup misses, so only the insert can notice the taken name
        fake.users.hide_from_lookup.store(true, Ordering::SeqCst);
        let body = format!("username={}&password=other", USERNAME);

        let response = fake
            .app
            .clone()
            .oneshot(post_form("/register", &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/register");

        let page = fake.page("/register", &session_cookie(&response)).await;
        assert!(page.contains("This username exists."));
    }

    #[tokio::test]
    async fn test_wrong_password_is_flashed() {
        let fake = FakeApp::new();
        let body = format!("username={}&password=wrong", USERNAME);

        let response = fake
            .app
            .clone()
            .oneshot(post_form("/login", &body))
            .await
            .unwrap();
        assert_eq!(location(&response), "/login");

        let page = fake.page("/login", &session_cookie(&response)).await;
        assert!(page.contains("Wrong password."));
    }
}
