use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    db::models::{NewReading, Reading},
    store::{RecordStore, StoreError},
};

/// Structural problems with an incoming payload. Range checks never happen
/// here: an alarming but well-formed value is stored so it can be flagged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("{field} must be a number or a numeric string")]
    NotNumeric { field: &'static str },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be a string, number or boolean")]
    NotText { field: &'static str },
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Looks up `snake` first, then its camelCase alias.
fn field<'a>(obj: &'a Map<String, Value>, snake: &str, camel: &str) -> Option<&'a Value> {
    obj.get(snake).or_else(|| obj.get(camel))
}

fn number(value: Option<&Value>, field: &'static str) -> Result<Option<f64>, ValidationError> {
    let n = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64().ok_or(ValidationError::NotNumeric { field })?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::NotNumeric { field })?,
        Some(_) => return Err(ValidationError::NotNumeric { field }),
    };
    if !n.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    Ok(Some(n))
}

fn text(value: Option<&Value>, field: &'static str) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(Value::Array(_) | Value::Object(_)) => Err(ValidationError::NotText { field }),
    }
}

/// Turns a decoded JSON payload into a [`NewReading`].
///
/// Every field is optional; unknown keys are ignored. Numeric strings are
/// coerced, and the door state is kept verbatim (scalars as their text form).
pub fn parse_reading(payload: &Value) -> Result<NewReading, ValidationError> {
    let obj = payload.as_object().ok_or(ValidationError::NotAnObject)?;

    Ok(NewReading {
        temperature: number(field(obj, "temperature", "temperature"), "temperature")?,
        door_status: text(field(obj, "door_status", "doorStatus"), "door_status")?,
        insulin_inventory_weight: number(
            field(obj, "insulin_inventory_weight", "insulinInventoryWeight"),
            "insulin_inventory_weight",
        )?,
        insulin_level_value: number(
            field(obj, "insulin_level_value", "insulinLevelValue"),
            "insulin_level_value",
        )?,
        glucose_value: number(field(obj, "glucose_value", "glucoseValue"), "glucose_value")?,
    })
}

#[derive(Clone)]
pub struct IngestionGateway {
    store: Arc<dyn RecordStore>,
}

impl IngestionGateway {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Validates `payload` and appends exactly one reading. Rejected payloads
    /// are never persisted; store failures are returned, not retried.
    pub async fn ingest(&self, payload: &Value) -> Result<Reading, IngestError> {
        let reading = parse_reading(payload).map_err(|e| {
            warn!(reason = %e, "Reading rejected");
            e
        })?;

        let stored = self.store.append(reading).await.map_err(|e| {
            error!(error = %e, "Failed to persist reading");
            e
        })?;

        info!(
            reading_id = stored.id,
            temperature = ?stored.temperature,
            door_status = ?stored.door_status,
            "Reading stored"
        );
        Ok(stored)
    }
}
