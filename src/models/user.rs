use serde::Deserialize;
use tokio_postgres::Row;

/// Registered user
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
}

impl From<&Row> for User {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
        }
    }
}

/// Form body shared by `/register` and `/login`
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Validated credentials
#[derive(Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl CredentialsForm {
    /// Returns the flash message for the first missing field.
    ///
    /// Usernames are trimmed; passwords are kept verbatim.
    pub fn validate(self) -> Result<Credentials, &'static str> {
        let username = super::non_blank(self.username).ok_or("You must provide a username.")?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or("You must provide a password.")?;
        Ok(Credentials { username, password })
    }
}
