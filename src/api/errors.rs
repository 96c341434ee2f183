use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::{ingestion::IngestError, store::StoreError};

#[derive(Debug)]
pub enum AppError {
    /// The request body could not be turned into a reading.
    Unprocessable(String),
    Store(StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Store(e) => {
                error!(error = %e, "Store call failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_owned())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Rejected(v) => Self::Unprocessable(v.to_string()),
            IngestError::Store(s) => Self::Store(s),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        Self::Unprocessable(e.body_text())
    }
}
