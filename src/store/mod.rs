//! Append-only access to persisted readings.
//!
//! The core only ever needs three access patterns: append one reading, fetch
//! the newest one, and fetch a bounded window in a given direction.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::{NewReading, Reading};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

/// Direction of a windowed read, always by `created_at` then insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Ascending,
    /// Newest first.
    Descending,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist one reading. `created_at` and `id` are assigned by the store.
    async fn append(&self, reading: NewReading) -> Result<Reading, StoreError>;

    /// The newest reading, if any.
    async fn most_recent(&self) -> Result<Option<Reading>, StoreError>;

    /// Up to `limit` readings ordered by `order`.
    async fn windowed(&self, order: SortOrder, limit: u32) -> Result<Vec<Reading>, StoreError>;
}
