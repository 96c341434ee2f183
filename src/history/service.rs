use std::{iter::FusedIterator, sync::Arc, vec};

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use super::chart::ChartView;
use crate::{
    db::models::Reading,
    store::{RecordStore, SortOrder, StoreError},
};

/// One charted sample. Door state and pen level are not charted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct HistoryPoint {
    #[serde(rename = "created_at")]
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub glucose_value: Option<f64>,
    pub insulin_inventory_weight: Option<f64>,
}

impl From<Reading> for HistoryPoint {
    fn from(r: Reading) -> Self {
        Self {
            timestamp: r.created_at,
            temperature: r.temperature,
            glucose_value: r.glucose_value,
            insulin_inventory_weight: r.insulin_inventory_weight,
        }
    }
}

/// Oldest-first sequence of [`HistoryPoint`]s, consumed once.
#[derive(Debug)]
pub struct HistoryWindow {
    rows: vec::IntoIter<Reading>,
}

impl Iterator for HistoryWindow {
    type Item = HistoryPoint;

    fn next(&mut self) -> Option<HistoryPoint> {
        self.rows.next().map(HistoryPoint::from)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for HistoryWindow {}
impl FusedIterator for HistoryWindow {}

#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn RecordStore>,
    default_limit: u32,
    max_limit: u32,
    offset: FixedOffset,
}

impl HistoryService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        default_limit: u32,
        max_limit: u32,
        offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            default_limit,
            max_limit,
            offset,
        }
    }

    /// Window size actually fetched for a caller-requested `limit`.
    pub fn effective_limit(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }

    /// Up to `limit` readings, oldest first. Note the direction is the
    /// opposite of the snapshot's newest-first lookup.
    pub async fn get_history(&self, limit: Option<u32>) -> Result<HistoryWindow, StoreError> {
        let limit = self.effective_limit(limit);
        let rows = self.store.windowed(SortOrder::Ascending, limit).await?;
        debug!(limit, points = rows.len(), "History window fetched");
        Ok(HistoryWindow {
            rows: rows.into_iter(),
        })
    }

    /// The same window shaped into chart labels and series.
    pub async fn get_chart(&self, limit: Option<u32>) -> Result<ChartView, StoreError> {
        let window = self.get_history(limit).await?;
        Ok(ChartView::from_points(window, self.offset))
    }
}
