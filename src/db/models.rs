use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One stored telemetry sample. Immutable once written.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Reading {
    /// Insertion sequence; breaks ties between equal `created_at` values.
    pub id: i64,
    /// Degrees Celsius
    pub temperature: Option<f64>,
    /// Free-form, canonically `OPEN` / `CLOSED`
    pub door_status: Option<String>,
    /// Grams
    pub insulin_inventory_weight: Option<f64>,
    /// Estimated dose units remaining in the pen
    pub insulin_level_value: Option<f64>,
    /// mg/dL
    pub glucose_value: Option<f64>,
    /// Assigned by the store at insert time.
    pub created_at: DateTime<Utc>,
}

/// A validated reading that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewReading {
    pub temperature: Option<f64>,
    pub door_status: Option<String>,
    pub insulin_inventory_weight: Option<f64>,
    pub insulin_level_value: Option<f64>,
    pub glucose_value: Option<f64>,
}
