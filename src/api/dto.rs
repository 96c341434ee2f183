use chrono::{DateTime, Offset, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    db::models::Reading,
    snapshot::{MetricStatuses, Snapshot},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadingDto {
    pub id: i64,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    pub door_status: Option<String>,
    /// Grams
    pub insulin_inventory_weight: Option<f64>,
    /// Estimated dose units remaining
    pub insulin_level_value: Option<f64>,
    /// mg/dL
    pub glucose_value: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<Reading> for ReadingDto {
    fn from(r: Reading) -> Self {
        Self {
            id: r.id,
            temperature: r.temperature,
            door_status: r.door_status,
            insulin_inventory_weight: r.insulin_inventory_weight,
            insulin_level_value: r.insulin_level_value,
            glucose_value: r.glucose_value,
            created_at: r.created_at,
        }
    }
}

/// Request body for `POST /api/readings`. Every field is optional; numeric
/// fields also accept numeric strings, and camelCase keys are accepted.
#[allow(dead_code)]
#[derive(Debug, ToSchema)]
pub struct IngestRequest {
    pub temperature: Option<f64>,
    pub door_status: Option<String>,
    pub insulin_inventory_weight: Option<f64>,
    pub insulin_level_value: Option<f64>,
    pub glucose_value: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IngestResponse {
    pub message: String,
    pub reading: ReadingDto,
}

/// Evaluated dashboard view of the newest reading.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SnapshotDto {
    NoData {
        last_updated: String,
    },
    Latest {
        reading: ReadingDto,
        last_updated: String,
        statuses: MetricStatuses,
    },
}

impl From<Snapshot> for SnapshotDto {
    fn from(s: Snapshot) -> Self {
        match s {
            Snapshot::NoData => SnapshotDto::NoData {
                last_updated: crate::display::last_updated(None, Utc.fix()),
            },
            Snapshot::Latest(view) => SnapshotDto::Latest {
                reading: view.reading.into(),
                last_updated: view.last_updated,
                statuses: view.statuses,
            },
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// Maximum number of points, oldest first.
    pub limit: Option<u32>,
}
