//! SQL query constants
//!
//! Contains all SQL queries used by the application.

/// Schema statements, run in order at startup
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(255) UNIQUE NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS books (
        isbn VARCHAR(32) PRIMARY KEY,
        title VARCHAR(512) NOT NULL,
        author VARCHAR(512) NOT NULL,
        year INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reviews (
        id SERIAL PRIMARY KEY,
        isbn VARCHAR(32) NOT NULL REFERENCES books(isbn) ON DELETE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
        text_review TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (user_id, isbn)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_reviews_isbn ON reviews(isbn)",
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        data JSONB NOT NULL,
        expiry_date TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_sessions_expiry ON sessions(expiry_date)",
];

pub const FIND_USER_BY_USERNAME: &str = r#"
    SELECT id, username, password_hash
    FROM users
    WHERE username = $1
"#;

pub const INSERT_USER: &str = r#"
    INSERT INTO users (username, password_hash)
    VALUES ($1, $2)
    RETURNING id, username, password_hash
"#;

pub const FIND_BOOK_BY_ISBN: &str = r#"
    SELECT isbn, title, author, year
    FROM books
    WHERE isbn = $1
"#;

/// Absent search fields are bound as NULL, which never matches
pub const SEARCH_BOOKS: &str = r#"
    SELECT isbn, title, author, year
    FROM books
    WHERE isbn ILIKE $1
       OR author ILIKE $2
       OR title ILIKE $3
    ORDER BY title
    LIMIT 10
"#;

pub const USER_HAS_REVIEWED: &str = r#"
    SELECT EXISTS (
        SELECT 1 FROM reviews WHERE user_id = $1 AND isbn = $2
    )
"#;

pub const INSERT_REVIEW: &str = r#"
    INSERT INTO reviews (isbn, user_id, rating, text_review)
    VALUES ($1, $2, $3, $4)
"#;

pub const LIST_REVIEWS_FOR_BOOK: &str = r#"
    SELECT u.username, r.rating, r.text_review, r.created_at
    FROM reviews r
    JOIN users u ON u.id = r.user_id
    WHERE r.isbn = $1
    ORDER BY r.created_at DESC
"#;

pub const REVIEW_STATS_FOR_BOOK: &str = r#"
    SELECT COUNT(*) AS review_count, AVG(rating)::float8 AS average_score
    FROM reviews
    WHERE isbn = $1
"#;

pub const INSERT_SESSION: &str = r#"
    INSERT INTO sessions (id, data, expiry_date)
    VALUES ($1, $2, $3)
    ON CONFLICT (id) DO NOTHING
"#;

pub const UPSERT_SESSION: &str = r#"
    INSERT INTO sessions (id, data, expiry_date)
    VALUES ($1, $2, $3)
    ON CONFLICT (id) DO UPDATE
    SET data = EXCLUDED.data, expiry_date = EXCLUDED.expiry_date
"#;

/// Expired rows are never returned, purged or not
pub const LOAD_SESSION: &str = r#"
    SELECT data
    FROM sessions
    WHERE id = $1 AND expiry_date > now()
"#;

pub const DELETE_SESSION: &str = "DELETE FROM sessions WHERE id = $1";

pub const DELETE_EXPIRED_SESSIONS: &str = "DELETE FROM sessions WHERE expiry_date <= now()";
