//! Authentication module
//!
//! Provides password hashing and session-backed login state.

mod middleware;
mod password;

pub use middleware::require_login;
pub use password::{hash_password, verify_password};

use crate::error::AppError;
use crate::models::User;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session key holding the logged-in user
const USER_KEY: &str = "user";

/// Identity of the logged-in user, kept in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Read the logged-in user, if any
pub async fn current_user(session: &Session) -> Result<Option<CurrentUser>, AppError> {
    Ok(session.get::<CurrentUser>(USER_KEY).await?)
}

/// Remember `user` for this session, rotating the session id
pub async fn log_in(session: &Session, user: &User) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(USER_KEY, CurrentUser::from(user)).await?;
    Ok(())
}

/// Forget everything stored in the session
pub async fn log_out(session: &Session) {
    session.clear().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn user() -> User {
        User {
            id: 7,
            username: "ada".into(),
            password_hash: String::new(),
        }
    }

    #[tokio::test]
    async fn test_log_in_and_out() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        assert_eq!(current_user(&session).await.unwrap(), None);

        log_in(&session, &user()).await.unwrap();
        assert_eq!(
            current_user(&session).await.unwrap(),
            Some(CurrentUser {
                id: 7,
                username: "ada".into(),
            })
        );

        log_out(&session).await;
        assert_eq!(current_user(&session).await.unwrap(), None);
    }
}
