use std::{future::Future, time::Duration};

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::time;

use super::{RecordStore, SortOrder, StoreError};
use crate::db::models::{NewReading, Reading};

const COLUMNS: &str = "id, temperature, door_status, insulin_inventory_weight, \
                       insulin_level_value, glucose_value, created_at";

/// [`RecordStore`] backed by the `readings` table.
///
/// Every query is bounded by `timeout`; an elapsed timeout surfaces as
/// [`StoreError::Timeout`] and is never retried here.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        time::timeout(self.timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
            .map_err(StoreError::from)
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn append(&self, reading: NewReading) -> Result<Reading, StoreError> {
        let sql = format!(
            "INSERT INTO readings \
                 (temperature, door_status, insulin_inventory_weight, \
                  insulin_level_value, glucose_value) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        self.bounded(
            sqlx::query_as::<_, Reading>(&sql)
                .bind(reading.temperature)
                .bind(reading.door_status)
                .bind(reading.insulin_inventory_weight)
                .bind(reading.insulin_level_value)
                .bind(reading.glucose_value)
                .fetch_one(&self.pool),
        )
        .await
    }

    async fn most_recent(&self) -> Result<Option<Reading>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM readings \
             ORDER BY created_at DESC, id DESC \
             LIMIT 1"
        );
        self.bounded(sqlx::query_as::<_, Reading>(&sql).fetch_optional(&self.pool))
            .await
    }

    async fn windowed(&self, order: SortOrder, limit: u32) -> Result<Vec<Reading>, StoreError> {
        let dir = match order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        let sql = format!(
            "SELECT {COLUMNS} FROM readings \
             ORDER BY created_at {dir}, id {dir} \
             LIMIT $1"
        );
        self.bounded(
            sqlx::query_as::<_, Reading>(&sql)
                .bind(i64::from(limit))
                .fetch_all(&self.pool),
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// Tests (need a live Postgres behind DATABASE_URL)
// ---------------------------------------------------------------------------
