use std::sync::Arc;

use chrono::FixedOffset;
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    classifier::{evaluate_door, Metric, SeverityStatus},
    db::models::Reading,
    display,
    store::{RecordStore, StoreError},
};

/// A metric's display text together with its severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MetricView {
    /// Formatted value, or `—` when absent.
    pub display_value: String,
    pub status: SeverityStatus,
}

impl MetricView {
    fn numeric(metric: Metric, value: Option<f64>) -> Self {
        Self {
            display_value: display::format_metric(metric, value),
            status: metric.evaluate(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MetricStatuses {
    pub temperature: MetricView,
    pub door: MetricView,
    pub inventory: MetricView,
    pub insulin_level: MetricView,
    pub glucose: MetricView,
}

/// Evaluated view of the newest reading.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestView {
    pub reading: Reading,
    pub last_updated: String,
    pub statuses: MetricStatuses,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// The store holds no readings yet.
    NoData,
    Latest(LatestView),
}

/// Runs every metric of `reading` through the classifier.
pub fn evaluate_reading(reading: &Reading) -> MetricStatuses {
    let door = evaluate_door(reading.door_status.as_deref());
    MetricStatuses {
        temperature: MetricView::numeric(Metric::Temperature, reading.temperature),
        door: MetricView {
            display_value: door.value,
            status: door.status,
        },
        inventory: MetricView::numeric(
            Metric::InsulinInventoryWeight,
            reading.insulin_inventory_weight,
        ),
        insulin_level: MetricView::numeric(Metric::InsulinLevel, reading.insulin_level_value),
        glucose: MetricView::numeric(Metric::Glucose, reading.glucose_value),
    }
}

#[derive(Clone)]
pub struct SnapshotService {
    store: Arc<dyn RecordStore>,
    offset: FixedOffset,
}

impl SnapshotService {
    pub fn new(store: Arc<dyn RecordStore>, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    /// Fetches the newest reading and evaluates it. An empty store yields
    /// [`Snapshot::NoData`]; store failures propagate untouched.
    pub async fn get_latest(&self) -> Result<Snapshot, StoreError> {
        let Some(reading) = self.store.most_recent().await? else {
            debug!("No readings stored yet");
            return Ok(Snapshot::NoData);
        };

        debug!(reading_id = reading.id, "Evaluating latest reading");
        let statuses = evaluate_reading(&reading);
        let last_updated = display::last_updated(Some(reading.created_at), self.offset);

        Ok(Snapshot::Latest(LatestView {
            reading,
            last_updated,
            statuses,
        }))
    }
}
