//! PostgreSQL-backed session store
//!
//! Sessions live in the `sessions` table so they survive restarts, and
//! [`purge_expired_sessions`] removes rows whose expiry has passed.

use super::queries;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use std::fmt;
use std::time::Duration;
use tokio_postgres::types::Json;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct PgSessionStore {
    pool: Pool,
}

impl PgSessionStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn client(&self) -> session_store::Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| session_store::Error::Backend(e.to_string()))
    }
}

impl fmt::Debug for PgSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgSessionStore")
            .field("pool_size", &self.pool.status().size)
            .finish()
    }
}

fn backend(e: tokio_postgres::Error) -> session_store::Error {
    session_store::Error::Backend(e.to_string())
}

fn expiry_of(record: &Record) -> session_store::Result<DateTime<Utc>> {
    let expiry = record.expiry_date;
    DateTime::from_timestamp(expiry.unix_timestamp(), expiry.nanosecond())
        .ok_or_else(|| session_store::Error::Encode(format!("expiry out of range: {}", expiry)))
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let client = self.client().await?;
        let expiry = expiry_of(record)?;

        // Draw a new id until it does not collide with a stored session
        loop {
            let inserted = client
                .execute(
                    queries::INSERT_SESSION,
                    &[&record.id.to_string(), &Json(&*record), &expiry],
                )
                .await
                .map_err(backend)?;
            if inserted == 1 {
                return Ok(());
            }
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let client = self.client().await?;
        client
            .execute(
                queries::UPSERT_SESSION,
                &[&record.id.to_string(), &Json(record), &expiry_of(record)?],
            )
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let client = self.client().await?;
        let row = client
            .query_opt(queries::LOAD_SESSION, &[&session_id.to_string()])
            .await
            .map_err(backend)?;

        row.map(|row| {
            row.try_get::<_, Json<Record>>("data")
                .map(|Json(record)| record)
                .map_err(|e| session_store::Error::Decode(e.to_string()))
        })
        .transpose()
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        let client = self.client().await?;
        client
            .execute(queries::DELETE_SESSION, &[&session_id.to_string()])
            .await
            .map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for PgSessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let client = self.client().await?;
        let deleted = client
            .execute(queries::DELETE_EXPIRED_SESSIONS, &[])
            .await
            .map_err(backend)?;
        debug!(deleted, "Purged expired sessions");
        Ok(())
    }
}

/// Delete expired sessions every `period`, forever.
///
/// A failed purge is logged and retried on the next tick.
pub async fn purge_expired_sessions<S>(store: S, period: Duration)
where
    S: ExpiredDeletion,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if let Err(e) = store.delete_expired().await {
            warn!(error = %e, "Failed to purge expired sessions");
        }
    }
}
