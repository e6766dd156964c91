//! PostgreSQL record store backend.
//!
//! All collections share the `records` table (see `migrations/`). Rows are
//! ordered by a `BIGSERIAL` sequence so `all()` returns insertion order, and an
//! upsert keeps the original position.

use secrecy::ExposeSecret;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::time::Duration;

use super::{decode, Collection, Record};
use crate::{
    config::DatabaseConfig,
    error::{Error, Result},
};

/// Database connection pool type
pub type DbPool = PgPool;

#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: DbPool,
}

impl PgBackend {
    /// Connect and run pending migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(config.connection_string().expose_secret())
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| Error::Internal(format!("Failed to run migrations: {}", e)))?;

        tracing::info!(
            host = %config.host,
            database = %config.database,
            "Connected to PostgreSQL record store"
        );

        Ok(Self { pool })
    }

    pub(crate) async fn all(&self, collection: Collection) -> Result<Vec<Value>> {
        let rows = sqlx::query(
            r#"
            SELECT body
            FROM records
            WHERE collection = $1
            ORDER BY seq
            "#,
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<Value, _>("body").map_err(Error::from))
            .collect()
    }

    pub(crate) async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let row = sqlx::query(
            r#"
            SELECT body
            FROM records
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| row.try_get::<Value, _>("body").map_err(Error::from))
            .transpose()
    }

    pub(crate) async fn put(&self, collection: Collection, id: &str, value: Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO records (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = EXCLUDED.body, updated_at = now()
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub(crate) async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM records
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(crate) async fn count(&self, collection: Collection) -> Result<usize> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM records
            WHERE collection = $1
            "#,
        )
        .bind(collection.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count as usize)
    }

    /// Check and write inside one transaction holding a per-collection
    /// advisory lock, so concurrent writers through this path serialize.
    pub(crate) async fn put_unless<R, F>(&self, record: &R, conflicts: F) -> Result<Option<R>>
    where
        R: Record,
        F: Fn(&R) -> bool + Send + Sync,
    {
        let value = serde_json::to_value(record)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(R::COLLECTION.as_str())
            .execute(&mut *tx)
            .await?;

        let rows = sqlx::query(
            r#"
            SELECT body
            FROM records
            WHERE collection = $1
            ORDER BY seq
            "#,
        )
        .bind(R::COLLECTION.as_str())
        .fetch_all(&mut *tx)
        .await?;

        for row in rows {
            let existing: R = decode(row.try_get::<Value, _>("body")?)?;
            if conflicts(&existing) {
                // dropping the transaction rolls it back and releases the lock
                return Ok(Some(existing));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO records (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = EXCLUDED.body, updated_at = now()
            "#,
        )
        .bind(R::COLLECTION.as_str())
        .bind(record.id())
        .bind(value)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(None)
    }

    /// Row-locked read-modify-write. Takes the same advisory lock as
    /// `put_unless`, so a status change and a guarded insert on one
    /// collection never interleave.
    pub(crate) async fn update<R, T, F>(&self, id: &str, apply: F) -> Result<Option<(R, T)>>
    where
        R: Record,
        T: Send,
        F: FnOnce(&mut R) -> Result<T> + Send,
    {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(R::COLLECTION.as_str())
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query(
            r#"
            SELECT body
            FROM records
            WHERE collection = $1 AND id = $2
            FOR UPDATE
            "#,
        )
        .bind(R::COLLECTION.as_str())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut record: R = decode(row.try_get::<Value, _>("body")?)?;
        let output = apply(&mut record)?;

        sqlx::query(
            r#"
            UPDATE records
            SET body = $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(R::COLLECTION.as_str())
        .bind(id)
        .bind(serde_json::to_value(&record)?)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some((record, output)))
    }

    pub(crate) async fn close(&self) {
        self.pool.close().await;
    }
}
