//! Routes and handlers for the dipia API.
//!
//! | route | purpose |
//! |-------|---------|
//! | `GET /health` | liveness |
//! | `POST /detections` | detector pushes a batch |
//! | `GET /detections/latest` | latest batch, or the empty sentinel |
//! | `GET, POST /owners/{owner}/materials` | list / create |
//! | `PUT, DELETE /owners/{owner}/materials/{id}` | replace / delete |
//! | `POST /owners/{owner}/materials/{id}/use` | record one use |
//! | `PUT /owners/{owner}/materials/{id}/favorite` | set favorite flag |
//! | `GET /owners/{owner}/materials/most-used` | top by usage |
//! | `GET /owners/{owner}/materials/recent` | newest |
//! | `GET /owners/{owner}/recommendations` | ranked materials |
//! | `GET /knowledge/{damage_type}` | damage reference sheet |

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use dipia_catalog::{CatalogError, CatalogStore, Material, MaterialId, NewMaterial, OwnerId};
use dipia_detection::{ClassMap, DetectionBatch, DetectionBatchPayload, DetectionInbox};
use dipia_intelligence::{lookup, KnowledgeEntry, Recommendation, RecommendError, RecommendationEngine};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;

/// Number of materials returned by the most-used and recent listings by default.
const DEFAULT_LISTING_LIMIT: usize = 5;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub inbox: Arc<DetectionInbox>,
    pub store: Arc<dyn CatalogStore>,
    pub engine: Arc<RecommendationEngine>,
    pub class_map: Arc<ClassMap>,
    pub fetch_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, engine: RecommendationEngine) -> Self {
        Self {
            inbox: Arc::new(DetectionInbox::new()),
            store,
            engine: Arc::new(engine),
            class_map: Arc::new(ClassMap::default()),
            fetch_timeout: Duration::from_millis(dipia_state::DEFAULT_FETCH_TIMEOUT_MS),
        }
    }

    pub fn with_class_map(mut self, class_map: ClassMap) -> Self {
        self.class_map = Arc::new(class_map);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}

/// Build the API router without security layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/detections", post(publish_detections))
        .route("/detections/latest", get(latest_detections))
        .route(
            "/owners/{owner}/materials",
            get(list_materials).post(create_material),
        )
        .route("/owners/{owner}/materials/most-used", get(most_used))
        .route("/owners/{owner}/materials/recent", get(recent))
        .route(
            "/owners/{owner}/materials/{id}",
            put(update_material).delete(delete_material),
        )
        .route("/owners/{owner}/materials/{id}/use", post(use_material))
        .route("/owners/{owner}/materials/{id}/favorite", put(set_favorite))
        .route("/owners/{owner}/recommendations", get(recommendations))
        .route("/knowledge/{damage_type}", get(knowledge))
        .with_state(state)
}

/// Error body `{ "error": "..." }` with a status derived from the failure kind.
#[derive(Debug)]
pub(crate) enum ApiError {
    Catalog(CatalogError),
    Recommend(RecommendError),
    NotFound(String),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        Self::Recommend(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Catalog(CatalogError::NotFound { .. }) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Catalog(err) if err.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Recommend(err) if err.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Recommend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Catalog(err) => err.to_string(),
            Self::Recommend(err) => err.to_string(),
            Self::NotFound(what) => format!("not found: {what}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::warn!(target: "dipia::http", status = status.as_u16(), error = %message, "Request failed");
        }
        let mut body = json!({ "error": message });
        if status == StatusCode::SERVICE_UNAVAILABLE {
            body["retryable"] = json!(true);
        }
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "detections_published": state.inbox.publish_count(),
    }))
}

async fn publish_detections(
    State(state): State<AppState>,
    Json(payload): Json<DetectionBatchPayload>,
) -> impl IntoResponse {
    let batch = payload.into_batch(&state.class_map, unix_seconds_now());
    let received = batch.len();
    state.inbox.publish(batch);
    Json(json!({ "success": true, "received": received }))
}

async fn latest_detections(State(state): State<AppState>) -> Json<DetectionBatch> {
    Json(state.inbox.latest().as_ref().clone())
}

async fn list_materials(
    State(state): State<AppState>,
    Path(owner): Path<OwnerId>,
) -> ApiResult<Json<Vec<Material>>> {
    Ok(Json(state.store.list_materials_by_owner(owner).await?))
}

async fn create_material(
    State(state): State<AppState>,
    Path(owner): Path<OwnerId>,
    Json(fields): Json<NewMaterial>,
) -> ApiResult<(StatusCode, Json<Material>)> {
    let created = state.store.create_material(owner, fields).await?;
    tracing::info!(target: "dipia::http", owner = %owner, id = %created.id, "Material created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_material(
    State(state): State<AppState>,
    Path((owner, id)): Path<(OwnerId, MaterialId)>,
    Json(fields): Json<NewMaterial>,
) -> ApiResult<Json<Material>> {
    Ok(Json(state.store.update_material(id, owner, fields).await?))
}

async fn delete_material(
    State(state): State<AppState>,
    Path((owner, id)): Path<(OwnerId, MaterialId)>,
) -> ApiResult<StatusCode> {
    state.store.delete_material(id, owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn use_material(
    State(state): State<AppState>,
    Path((owner, id)): Path<(OwnerId, MaterialId)>,
) -> ApiResult<Json<serde_json::Value>> {
    let usage_count = state.store.update_usage_count(id, owner).await?;
    Ok(Json(json!({ "id": id, "usage_count": usage_count })))
}

#[derive(Debug, Deserialize)]
struct FavoriteBody {
    is_favorite: bool,
}

async fn set_favorite(
    State(state): State<AppState>,
    Path((owner, id)): Path<(OwnerId, MaterialId)>,
    Json(body): Json<FavoriteBody>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .store
        .update_favorite(id, owner, body.is_favorite)
        .await?;
    Ok(Json(json!({ "id": id, "is_favorite": body.is_favorite })))
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

async fn most_used(
    State(state): State<AppState>,
    Path(owner): Path<OwnerId>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Material>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LISTING_LIMIT);
    Ok(Json(state.store.most_used(owner, limit).await?))
}

async fn recent(
    State(state): State<AppState>,
    Path(owner): Path<OwnerId>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Material>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LISTING_LIMIT);
    Ok(Json(state.store.recent(owner, limit).await?))
}

#[derive(Debug, Deserialize)]
struct RecommendQuery {
    /// Comma-separated labels; the latest inbox batch's pathologies are used when absent.
    labels: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct RecommendResponse {
    owner: OwnerId,
    labels: Vec<String>,
    total_found: usize,
    recommendations: Vec<Recommendation>,
}

async fn recommendations(
    State(state): State<AppState>,
    Path(owner): Path<OwnerId>,
    Query(query): Query<RecommendQuery>,
) -> ApiResult<Json<RecommendResponse>> {
    let labels = match query.labels {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        None => state.inbox.latest().pathology_labels(),
    };

    let mut recommendations = state
        .engine
        .recommend_from_store(state.store.as_ref(), &labels, owner, state.fetch_timeout)
        .await?;
    let total_found = recommendations.len();
    if let Some(limit) = query.limit {
        recommendations.truncate(limit);
    }

    Ok(Json(RecommendResponse {
        owner,
        labels,
        total_found,
        recommendations,
    }))
}

async fn knowledge(Path(damage_type): Path<String>) -> ApiResult<Json<&'static KnowledgeEntry>> {
    lookup(&damage_type)
        .map(Json)
        .ok_or(ApiError::NotFound(damage_type))
}

fn unix_seconds_now() -> f64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1e9
}
