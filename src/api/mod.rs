pub mod dto;
pub mod errors;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{FixedOffset, Offset, Utc};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    config::Config,
    history::HistoryService,
    ingestion::IngestionGateway,
    snapshot::SnapshotService,
    store::RecordStore,
};
use handlers::ApiDoc;

/// Knobs the HTTP layer needs from [`Config`].
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub history_limit: u32,
    pub history_max_limit: u32,
    pub recent_limit: u32,
    pub display_offset: FixedOffset,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            history_limit: 200,
            history_max_limit: 5000,
            recent_limit: 100,
            display_offset: Utc.fix(),
        }
    }
}

impl From<&Config> for ApiSettings {
    fn from(c: &Config) -> Self {
        Self {
            history_limit: c.history_limit,
            history_max_limit: c.history_max_limit,
            recent_limit: c.recent_limit,
            display_offset: c.display_offset,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub snapshot: SnapshotService,
    pub history: HistoryService,
    pub ingestion: IngestionGateway,
    pub recent_limit: u32,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, settings: &ApiSettings) -> Self {
        Self {
            snapshot: SnapshotService::new(store.clone(), settings.display_offset),
            history: HistoryService::new(
                store.clone(),
                settings.history_limit,
                settings.history_max_limit,
                settings.display_offset,
            ),
            ingestion: IngestionGateway::new(store.clone()),
            recent_limit: settings.recent_limit,
            store,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route(
            "/api/readings",
            post(handlers::post_reading).get(handlers::list_readings),
        )
        .route("/api/latest", get(handlers::get_latest))
        .route("/api/latest/status", get(handlers::get_latest_status))
        .route("/api/history", get(handlers::get_history))
        .route("/api/history/chart", get(handlers::get_history_chart))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
