//! Data models and form payloads
//!
//! Contains the domain records and request/response structures.

pub mod book;
pub mod review;
pub mod user;

// Re-export commonly used types
pub use book::*;
pub use review::*;
pub use user::*;

/// Treat missing, empty and whitespace-only form fields alike
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
