use async_trait::async_trait;
use futures::stream::{StreamExt, TryStreamExt};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

use crate::models::{CandidateHint, ProfileDocument, ProfileId};
use crate::services::store::{CandidateStream, ProfileStore, StoreError};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid profile document {id}: {reason}")]
    InvalidDocument { id: String, reason: String },
}

/// Pool options for the profile database
#[derive(Debug, Clone)]
pub struct PostgresConnection {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// Profile store backed by a PostgreSQL `profiles` table
///
/// Each row keeps the full profile document as JSONB next to the columns the
/// candidate query filters on (`gender`, `is_verified`).
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    /// Connect and run pending migrations
    pub async fn connect(connection: &PostgresConnection) -> Result<Self, PostgresError> {
        tracing::info!(
            "Connecting to PostgreSQL (max connections: {})",
            connection.max_connections
        );

        let pool = PgPoolOptions::new()
            .max_connections(connection.max_connections)
            .min_connections(connection.min_connections)
            .acquire_timeout(Duration::from_secs(connection.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(connection.idle_timeout_secs))
            .test_before_acquire(true)
            .connect(&connection.url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Decode the JSONB document of row `id`
    fn parse_document(id: String, raw: serde_json::Value) -> Result<ProfileDocument, PostgresError> {
        match serde_json::from_value::<ProfileDocument>(raw) {
            Ok(mut document) => {
                document.id = id;
                Ok(document)
            }
            Err(e) => Err(PostgresError::InvalidDocument {
                id,
                reason: e.to_string(),
            }),
        }
    }

    fn decode_row(row: &PgRow) -> Result<ProfileDocument, PostgresError> {
        let id: String = row.try_get("id")?;
        let Json(raw): Json<serde_json::Value> = row.try_get("document")?;
        Self::parse_document(id, raw)
    }

    /// Drop undecodable candidate rows; other errors end the stream
    fn skip_invalid(
        decoded: Result<ProfileDocument, PostgresError>,
    ) -> Result<Option<ProfileDocument>, PostgresError> {
        match decoded {
            Ok(document) => Ok(Some(document)),
            Err(PostgresError::InvalidDocument { id, reason }) => {
                tracing::warn!("Skipping undecodable profile document {}: {}", id, reason);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn get_profile(&self, id: &ProfileId) -> Result<Option<ProfileDocument>, StoreError> {
        let row = sqlx::query("SELECT id, document FROM profiles WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        Ok(row.map(|row| Self::decode_row(&row)).transpose()?)
    }

    async fn stream_candidates<'a>(&'a self, hint: CandidateHint) -> Result<CandidateStream<'a>, StoreError> {
        let query = r#"
            SELECT id, document
            FROM profiles
            WHERE id <> $1
              AND ($2::TEXT IS NULL OR gender = $2)
              AND (NOT $3 OR is_verified)
            ORDER BY id
            LIMIT $4
        "#;

        let rows = sqlx::query(query)
            .bind(hint.exclude_id.to_string())
            .bind(hint.gender.map(|g| g.as_str()))
            .bind(hint.verified_only)
            .bind(i64::try_from(hint.limit).unwrap_or(i64::MAX))
            .fetch(&self.pool);

        let candidates = rows
            .map_err(PostgresError::from)
            .map(|row| Self::skip_invalid(row.and_then(|row| Self::decode_row(&row))))
            .try_filter_map(|document| futures::future::ready(Ok(document)))
            .map_err(StoreError::from);

        Ok(candidates.boxed())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(|e| PostgresError::from(e).into())
    }
}
