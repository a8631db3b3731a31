//! HTTP API handlers.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{header, Uri},
    response::IntoResponse,
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use serde_json::Value;
use percent_encoding::percent_decode_str;
use tracing::{error, info, instrument, warn};
use utoipa::{OpenApi, ToSchema};

use super::docs::ApiDoc;
use super::error::{ApiError, ErrorBody};
use crate::data::{
    sanitize_build_id, Build, Collection, CpStar, DataRoot, SetItem, Skill, PERMAFROST_MARSHAL_ID,
};
use crate::metrics::inc_requests;

/// Service name reported by the health check.
pub const SERVICE_NAME: &str = "eso-build-engine-backend";

const ROUTE_HEALTH: &str = "health";
const ROUTE_SUMMARY: &str = "data_summary";
const ROUTE_DATA: &str = "data";
const ROUTE_BUILDS: &str = "builds_list";
const ROUTE_BUILD: &str = "build_by_id";
const ROUTE_PERMAFROST: &str = "build_permafrost_marshal";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository root the handlers read from.
    pub store: DataRoot,
    /// Prometheus render handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state without metrics.
    pub fn new(store: DataRoot) -> Self {
        Self {
            store,
            metrics: None,
        }
    }

    /// Attach a Prometheus handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
}

/// Collection counts.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataSummary {
    pub skills_count: usize,
    pub effects_count: usize,
    pub sets_count: usize,
    pub cp_stars_count: usize,
}

/// Skills, sets and CP stars, as stored on disk.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataBundle {
    #[schema(value_type = Vec<Skill>)]
    pub skills: Vec<Value>,
    #[schema(value_type = Vec<SetItem>)]
    pub sets: Vec<Value>,
    #[schema(value_type = Vec<CpStar>)]
    pub cp_stars: Vec<Value>,
}

/// Available build ids.
#[derive(Debug, Serialize, ToSchema)]
pub struct BuildList {
    pub builds: Vec<String>,
}

/// Health check handler - always returns 200.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> impl IntoResponse {
    inc_requests(ROUTE_HEALTH);
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
    })
}

/// Count every top-level collection. Any single failure fails the request.
#[utoipa::path(
    get,
    path = "/api/data/summary",
    responses(
        (status = 200, description = "Collection counts", body = DataSummary),
        (status = 500, description = "A data file failed to load", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn data_summary(State(state): State<AppState>) -> Result<Json<DataSummary>, ApiError> {
    inc_requests(ROUTE_SUMMARY);
    let store = &state.store;

    let loaded = tokio::try_join!(
        store.load_collection(Collection::Skills),
        store.load_collection(Collection::Effects),
        store.load_collection(Collection::Sets),
        store.load_collection(Collection::CpStars),
    );

    match loaded {
        Ok((skills, effects, sets, cp_stars)) => {
            let payload = DataSummary {
                skills_count: skills.len(),
                effects_count: effects.len(),
                sets_count: sets.len(),
                cp_stars_count: cp_stars.len(),
            };
            info!(?payload, "Data summary payload");
            Ok(Json(payload))
        }
        Err(e) => {
            error!(error = %e, "Failed to load data JSONs");
            Err(ApiError::SummaryUnavailable.on(ROUTE_SUMMARY))
        }
    }
}

/// Skills, sets and CP stars for selector UIs. Effects are not included.
#[utoipa::path(
    get,
    path = "/api/data",
    responses(
        (status = 200, description = "Reference collections", body = DataBundle),
        (status = 500, description = "A data file failed to load", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn data_bundle(State(state): State<AppState>) -> Result<Json<DataBundle>, ApiError> {
    inc_requests(ROUTE_DATA);
    let store = &state.store;

    let loaded = tokio::try_join!(
        store.load_collection(Collection::Skills),
        store.load_collection(Collection::Sets),
        store.load_collection(Collection::CpStars),
    );

    match loaded {
        Ok((skills, sets, cp_stars)) => Ok(Json(DataBundle {
            skills,
            sets,
            cp_stars,
        })),
        Err(e) => {
            error!(error = %e, "Failed to load data for /api/data");
            Err(ApiError::DataUnavailable.on(ROUTE_DATA))
        }
    }
}

/// List the ids of every build document.
#[utoipa::path(
    get,
    path = "/api/builds",
    responses(
        (status = 200, description = "Build ids", body = BuildList),
        (status = 500, description = "Builds directory unreadable", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn list_builds(State(state): State<AppState>) -> Result<Json<BuildList>, ApiError> {
    inc_requests(ROUTE_BUILDS);
    match state.store.list_builds().await {
        Ok(builds) => Ok(Json(BuildList { builds })),
        Err(e) => {
            error!(error = %e, "Failed to list builds");
            Err(ApiError::BuildsUnavailable.on(ROUTE_BUILDS))
        }
    }
}

/// Load a build by id. Missing and unreadable files both answer 404.
#[utoipa::path(
    get,
    path = "/api/builds/{id}",
    params(("id" = String, Path, description = "Build file stem; characters outside [A-Za-z0-9-] are stripped")),
    responses(
        (status = 200, description = "Build document", body = Build),
        (status = 400, description = "Id empty after sanitization", body = ErrorBody),
        (status = 404, description = "Build missing or unreadable", body = ErrorBody)
    )
)]
#[instrument(skip(state, id))]
pub async fn build_by_id(
    State(state): State<AppState>,
    uri: Uri,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    inc_requests(ROUTE_BUILD);

    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => {
            warn!(error = %rejection, "Build id is not valid UTF-8, decoding lossily");
            last_segment_lossy(&uri)
        }
    };

    let safe_id = sanitize_build_id(&id);
    if safe_id.is_empty() {
        return Err(ApiError::InvalidBuildId.on(ROUTE_BUILD));
    }

    match state.store.load_build_raw(&safe_id).await {
        Ok(build) => Ok(Json(build)),
        Err(e) => {
            error!(id = %safe_id, error = %e, "Failed to load build");
            Err(ApiError::BuildNotFound.on(ROUTE_BUILD))
        }
    }
}

/// Percent-decode the last non-empty path segment, replacing invalid UTF-8.
fn last_segment_lossy(uri: &Uri) -> String {
    let segment = uri
        .path()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// `/api/builds/` with nothing after the slash.
pub async fn empty_build_id() -> ApiError {
    inc_requests(ROUTE_BUILD);
    ApiError::InvalidBuildId.on(ROUTE_BUILD)
}

/// Fixed alias for the Permafrost Marshal build. Failures answer 500.
#[utoipa::path(
    get,
    path = "/api/builds/permafrost-marshal",
    responses(
        (status = 200, description = "Build document", body = Build),
        (status = 500, description = "Build missing or unreadable", body = ErrorBody)
    )
)]
#[instrument(skip(state))]
pub async fn permafrost_marshal(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    inc_requests(ROUTE_PERMAFROST);
    match state.store.load_build_raw(PERMAFROST_MARSHAL_ID).await {
        Ok(build) => Ok(Json(build)),
        Err(e) => {
            error!(error = %e, "Failed to load Permafrost Marshal build");
            Err(ApiError::PermafrostUnavailable.on(ROUTE_PERMAFROST))
        }
    }
}

/// Prometheus exposition.
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let handle = state.metrics.as_ref().ok_or(ApiError::MetricsDisabled)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}

/// OpenAPI document for the API.
pub async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serializes_camel_case() {
        let summary = DataSummary {
            skills_count: 1,
            effects_count: 2,
            sets_count: 3,
            cp_stars_count: 4,
        };
        let value = serde_json::to_value(summary).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "skillsCount": 1,
                "effectsCount": 2,
                "setsCount": 3,
                "cpStarsCount": 4
            })
        );
    }

    #[test]
    fn bundle_uses_cp_stars_key() {
        let bundle = DataBundle {
            skills: vec![],
            sets: vec![],
            cp_stars: vec![serde_json::json!({"id": "cp.a"})],
        };
        let value = serde_json::to_value(bundle).unwrap();
        assert_eq!(value["cpStars"][0]["id"], "cp.a");
        assert!(value.get("effects").is_none());
    }
}
