use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use serde_json::Value;
use utoipa::OpenApi;

use super::{
    dto::{HistoryParams, IngestRequest, IngestResponse, ReadingDto, SnapshotDto},
    errors::AppError,
    AppState,
};
use crate::{
    classifier::{SeverityStatus, Tier},
    history::{ChartSeries, ChartView, HistoryPoint},
    snapshot::{MetricStatuses, MetricView},
    store::SortOrder,
};

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// Store one reading pushed by the fridge controller.
#[utoipa::path(
    post,
    path = "/api/readings",
    request_body = IngestRequest,
    responses(
        (status = 200, description = "Reading stored", body = IngestResponse),
        (status = 422, description = "Malformed payload"),
        (status = 500, description = "Database error"),
    ),
    tag = "readings"
)]
pub async fn post_reading(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<IngestResponse>, AppError> {
    let Json(payload) = payload?;
    let stored = state.ingestion.ingest(&payload).await?;

    Ok(Json(IngestResponse {
        message: "Data inserted successfully".to_owned(),
        reading: stored.into(),
    }))
}

/// Most recent readings, newest first.
#[utoipa::path(
    get,
    path = "/api/readings",
    responses(
        (status = 200, description = "Recent readings", body = Vec<ReadingDto>),
        (status = 500, description = "Database error"),
    ),
    tag = "readings"
)]
pub async fn list_readings(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReadingDto>>, AppError> {
    let rows = state
        .store
        .windowed(SortOrder::Descending, state.recent_limit)
        .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// The newest raw reading, or `null` when nothing has been stored yet.
#[utoipa::path(
    get,
    path = "/api/latest",
    responses(
        (status = 200, description = "Latest reading or null", body = ReadingDto),
        (status = 500, description = "Database error"),
    ),
    tag = "readings"
)]
pub async fn get_latest(
    State(state): State<AppState>,
) -> Result<Json<Option<ReadingDto>>, AppError> {
    let row = state.store.most_recent().await?;
    Ok(Json(row.map(Into::into)))
}

// ---------------------------------------------------------------------------
// Dashboard views
// ---------------------------------------------------------------------------

/// The newest reading with every metric classified.
#[utoipa::path(
    get,
    path = "/api/latest/status",
    responses(
        (status = 200, description = "Evaluated snapshot", body = SnapshotDto),
        (status = 500, description = "Database error"),
    ),
    tag = "dashboard"
)]
pub async fn get_latest_status(
    State(state): State<AppState>,
) -> Result<Json<SnapshotDto>, AppError> {
    let snapshot = state.snapshot.get_latest().await?;
    Ok(Json(snapshot.into()))
}

/// Time series for charting, oldest first.
#[utoipa::path(
    get,
    path = "/api/history",
    params(HistoryParams),
    responses(
        (status = 200, description = "History points", body = Vec<HistoryPoint>),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Database error"),
    ),
    tag = "dashboard"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<HistoryPoint>>, AppError> {
    let window = state.history.get_history(params.limit).await?;
    Ok(Json(window.collect()))
}

/// History window shaped into chart labels and series.
#[utoipa::path(
    get,
    path = "/api/history/chart",
    params(HistoryParams),
    responses(
        (status = 200, description = "Chart view", body = ChartView),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Database error"),
    ),
    tag = "dashboard"
)]
pub async fn get_history_chart(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<ChartView>, AppError> {
    let chart = state.history.get_chart(params.limit).await?;
    Ok(Json(chart))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI document
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        post_reading,
        list_readings,
        get_latest,
        get_latest_status,
        get_history,
        get_history_chart,
        health
    ),
    components(schemas(
        ReadingDto,
        IngestRequest,
        IngestResponse,
        SnapshotDto,
        MetricStatuses,
        MetricView,
        SeverityStatus,
        Tier,
        HistoryPoint,
        ChartView,
        ChartSeries
    )),
    tags(
        (name = "readings",  description = "Raw telemetry ingestion and retrieval"),
        (name = "dashboard", description = "Evaluated views for the status dashboard"),
        (name = "system",    description = "System endpoints"),
    ),
    info(
        title = "Insulin Fridge Telemetry API",
        version = "0.1.0",
        description = "Telemetry ingestion and safety-threshold evaluation for a refrigerated insulin store"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    use crate::{
        api::{router, ApiSettings, AppState},
        db::models::{NewReading, Reading},
        store::{MemoryStore, RecordStore, SortOrder, StoreError},
    };

    fn test_server(store: &MemoryStore) -> TestServer {
        let state = AppState::new(Arc::new(store.clone()), &ApiSettings::default());
        TestServer::new(router(state)).unwrap()
    }

    fn reading(temperature: f64) -> NewReading {
        NewReading {
            temperature: Some(temperature),
            door_status: Some("CLOSED".into()),
            insulin_inventory_weight: Some(25.0),
            insulin_level_value: Some(90.0),
            glucose_value: Some(105.0),
        }
    }

    struct UnreachableStore;

    #[async_trait]
    impl RecordStore for UnreachableStore {
        async fn append(&self, _: NewReading) -> Result<Reading, StoreError> {
            Err(StoreError::Timeout(Duration::from_secs(1)))
        }

        async fn most_recent(&self) -> Result<Option<Reading>, StoreError> {
            Err(StoreError::Timeout(Duration::from_secs(1)))
        }

        async fn windowed(&self, _: SortOrder, _: u32) -> Result<Vec<Reading>, StoreError> {
            Err(StoreError::Timeout(Duration::from_secs(1)))
        }
    }

    // -----------------------------------------------------------------------
    // POST /api/readings
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn post_reading_stores_and_echoes_it() {
        let store = MemoryStore::new();
        let server = test_server(&store);

        let resp = server
            .post("/api/readings")
            .json(&json!({
                "temperature": 4.2,
                "door_status": "CLOSED",
                "insulin_inventory_weight": 30.5,
                "insulin_level_value": 150,
                "glucose_value": 99
            }))
            .await;
        resp.assert_status_ok();

        let body: Value = resp.json();
        assert_eq!(body["message"], "Data inserted successfully");
        assert_eq!(body["reading"]["temperature"], 4.2);
        assert_eq!(body["reading"]["door_status"], "CLOSED");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn post_reading_accepts_out_of_range_values() {
        let store = MemoryStore::new();
        let server = test_server(&store);

        server
            .post("/api/readings")
            .json(&json!({ "temperature": 15 }))
            .await
            .assert_status_ok();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn post_reading_rejects_non_numeric_value() {
        let store = MemoryStore::new();
        let server = test_server(&store);

        let resp = server
            .post("/api/readings")
            .json(&json!({ "glucose_value": "sweet" }))
            .await;
        resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = resp.json();
        assert!(body["error"].as_str().unwrap().contains("glucose_value"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn post_reading_rejects_non_object_body() {
        let store = MemoryStore::new();
        let server = test_server(&store);

        let resp = server.post("/api/readings").json(&json!([1, 2, 3])).await;
        resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn store_failure_is_a_500() {
        let state = AppState::new(Arc::new(UnreachableStore), &ApiSettings::default());
        let server = TestServer::new(router(state)).unwrap();

        let resp = server
            .post("/api/readings")
            .json(&json!({ "temperature": 4.0 }))
            .await;
        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = resp.json();
        assert_eq!(body["error"], "Database error");

        server
            .get("/api/latest/status")
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    // -----------------------------------------------------------------------
    // GET /api/readings, /api/latest
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn list_readings_is_newest_first() {
        let store = MemoryStore::new();
        for t in [3.0, 4.0, 5.0] {
            store.append(reading(t)).await.unwrap();
        }
        let server = test_server(&store);

        let body: Vec<Value> = server.get("/api/readings").await.json();
        assert_eq!(body.len(), 3);
        assert_eq!(body[0]["temperature"], 5.0);
        assert_eq!(body[2]["temperature"], 3.0);
    }

    #[tokio::test]
    async fn latest_is_null_when_empty() {
        let server = test_server(&MemoryStore::new());
        let resp = server.get("/api/latest").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn latest_returns_most_recent() {
        let store = MemoryStore::new();
        store.append(reading(3.0)).await.unwrap();
        store.append(reading(7.5)).await.unwrap();
        let server = test_server(&store);

        let body: Value = server.get("/api/latest").await.json();
        assert_eq!(body["temperature"], 7.5);
        assert_eq!(body["glucose_value"], 105.0);
    }

    // -----------------------------------------------------------------------
    // GET /api/latest/status
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn status_reports_no_data_on_empty_store() {
        let server = test_server(&MemoryStore::new());
        let resp = server.get("/api/latest/status").await;
        resp.assert_status_ok();

        let body: Value = resp.json();
        assert_eq!(body["state"], "no_data");
        assert_eq!(body["last_updated"], "Last updated: —");
        assert!(body.get("statuses").is_none());
    }

    #[tokio::test]
    async fn status_classifies_every_metric() {
        let store = MemoryStore::new();
        store
            .append(NewReading {
                temperature: Some(11.0),
                door_status: Some(" open ".into()),
                insulin_inventory_weight: None,
                insulin_level_value: Some(12.0),
                glucose_value: Some(150.0),
            })
            .await
            .unwrap();
        let server = test_server(&store);

        let body: Value = server.get("/api/latest/status").await.json();
        assert_eq!(body["state"], "latest");

        let s = &body["statuses"];
        assert_eq!(s["temperature"]["display_value"], "11.0");
        assert_eq!(s["temperature"]["status"]["tier"], "crit");
        assert_eq!(s["door"]["display_value"], "OPEN");
        assert_eq!(s["door"]["status"]["label"], "Open – check quickly");
        assert_eq!(s["inventory"]["display_value"], "—");
        assert_eq!(s["inventory"]["status"]["tier"], "unknown");
        assert_eq!(s["insulin_level"]["status"]["tier"], "warn");
        assert_eq!(s["glucose"]["status"]["label"], "Elevated");
    }

    // -----------------------------------------------------------------------
    // GET /api/history, /api/history/chart
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn history_is_oldest_first_without_door_or_pen_level() {
        let store = MemoryStore::new();
        for t in [3.0, 4.0, 5.0] {
            store.append(reading(t)).await.unwrap();
        }
        let server = test_server(&store);

        let body: Vec<Value> = server.get("/api/history").await.json();
        assert_eq!(body.len(), 3);
        assert_eq!(body[0]["temperature"], 3.0);
        assert!(body[0]["created_at"].as_str().unwrap() <= body[2]["created_at"].as_str().unwrap());
        assert!(body[0].get("door_status").is_none());
        assert!(body[0].get("insulin_level_value").is_none());
    }

    #[tokio::test]
    async fn history_honours_limit() {
        let store = MemoryStore::new();
        for t in [3.0, 4.0, 5.0] {
            store.append(reading(t)).await.unwrap();
        }
        let server = test_server(&store);

        let body: Vec<Value> = server.get("/api/history").add_query_param("limit", 2).await.json();
        assert_eq!(body.len(), 2);
    }

    #[tokio::test]
    async fn history_rejects_invalid_limit() {
        let server = test_server(&MemoryStore::new());
        server
            .get("/api/history")
            .add_query_param("limit", "lots")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn history_empty_is_empty_array() {
        let server = test_server(&MemoryStore::new());
        let resp = server.get("/api/history").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn chart_lines_up_labels_and_series() {
        let store = MemoryStore::new();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 14, 5, 0).unwrap();
        store.append_at(reading(4.0), at).await;
        store
            .append_at(NewReading::default(), at + chrono::Duration::minutes(10))
            .await;
        let server = test_server(&store);

        let body: Value = server.get("/api/history/chart").await.json();
        assert_eq!(body["labels"], json!(["14:05", "14:15"]));
        assert_eq!(body["range"], "Showing 2 points • 2024-06-01");
        assert_eq!(body["series"][0]["values"], json!([4.0, null]));
        assert_eq!(body["series"][1]["label"], "Glucose (mg/dL)");
    }

    // -----------------------------------------------------------------------
    // GET /health, /api-docs/openapi.json
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn health_returns_ok() {
        let server = test_server(&MemoryStore::new());
        let resp = server.get("/health").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn openapi_spec_is_served() {
        let server = test_server(&MemoryStore::new());
        let resp = server.get("/api-docs/openapi.json").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["info"]["title"], "Insulin Fridge Telemetry API");
        assert!(body["paths"]["/api/latest/status"].is_object());
    }
}
