use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{RecordStore, SortOrder, StoreError};
use crate::db::models::{NewReading, Reading};

/// In-memory [`RecordStore`] used by tests and local tooling.
///
/// Wrapped in `Arc` so clones share the same rows. Timestamps are taken from
/// the wall clock but never go backwards relative to the previous insert.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Vec<Reading>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append with an explicit `created_at`, bypassing the clock.
    pub async fn append_at(&self, reading: NewReading, created_at: DateTime<Utc>) -> Reading {
        push(&mut *self.inner.write().await, reading, created_at)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    async fn sorted(&self) -> Vec<Reading> {
        let mut rows = self.inner.read().await.clone();
        rows.sort_by_key(|r| (r.created_at, r.id));
        rows
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn append(&self, reading: NewReading) -> Result<Reading, StoreError> {
        let mut rows = self.inner.write().await;
        let now = Utc::now();
        let created_at = rows
            .iter()
            .map(|r| r.created_at)
            .max()
            .map_or(now, |last| last.max(now));
        Ok(push(&mut rows, reading, created_at))
    }

    async fn most_recent(&self) -> Result<Option<Reading>, StoreError> {
        Ok(self.sorted().await.pop())
    }

    async fn windowed(&self, order: SortOrder, limit: u32) -> Result<Vec<Reading>, StoreError> {
        let mut rows = self.sorted().await;
        if order == SortOrder::Descending {
            rows.reverse();
        }
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

fn push(rows: &mut Vec<Reading>, reading: NewReading, created_at: DateTime<Utc>) -> Reading {
    let stored = Reading {
        id: rows.len() as i64 + 1,
        temperature: reading.temperature,
        door_status: reading.door_status,
        insulin_inventory_weight: reading.insulin_inventory_weight,
        insulin_level_value: reading.insulin_level_value,
        glucose_value: reading.glucose_value,
        created_at,
    };
    rows.push(stored.clone());
    stored
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn with_temperature(t: f64) -> NewReading {
        NewReading {
            temperature: Some(t),
            ..NewReading::default()
        }
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);
        assert!(store.most_recent().await.unwrap().is_none());
        assert!(store.windowed(SortOrder::Descending, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_assigns_increasing_ids_and_timestamps() {
        let store = MemoryStore::new();
        let a = store.append(with_temperature(4.0)).await.unwrap();
        let b = store.append(with_temperature(5.0)).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(b.created_at >= a.created_at);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn ties_on_created_at_resolve_by_insertion_order() {
        let store = MemoryStore::new();
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        store.append_at(with_temperature(1.0), ts).await;
        store.append_at(with_temperature(2.0), ts).await;

        let latest = store.most_recent().await.unwrap().unwrap();
        assert_eq!(latest.temperature, Some(2.0));

        let asc = store.windowed(SortOrder::Ascending, 10).await.unwrap();
        assert_eq!(asc[0].temperature, Some(1.0));
    }

    #[tokio::test]
    async fn windowed_orders_by_created_at_not_arrival() {
        let store = MemoryStore::new();
        let early = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        store.append_at(with_temperature(9.0), late).await;
        store.append_at(with_temperature(8.0), early).await;

        let asc = store.windowed(SortOrder::Ascending, 10).await.unwrap();
        assert_eq!(asc[0].created_at, early);

        let desc = store.windowed(SortOrder::Descending, 1).await.unwrap();
        assert_eq!(desc.len(), 1);
        assert_eq!(desc[0].created_at, late);
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store.append(with_temperature(6.0)).await.unwrap();

        let got = clone.most_recent().await.unwrap().unwrap();
        assert_eq!(got.temperature, Some(6.0));
    }
}
