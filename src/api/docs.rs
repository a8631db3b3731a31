//! OpenAPI document for the data server.

use utoipa::OpenApi;

use super::error::ErrorBody;
use super::handlers::{self, BuildList, DataBundle, DataSummary, HealthResponse};
use crate::data::{Build, CpStar, Effect, SetItem, Skill};

/// OpenAPI description of every `/api` route.
#[derive(OpenApi)]
#[openapi(
    info(title = "ESO Build Engine API", description = "Read-only reference data and builds"),
    paths(
        handlers::health,
        handlers::data_summary,
        handlers::data_bundle,
        handlers::list_builds,
        handlers::build_by_id,
        handlers::permafrost_marshal,
    ),
    components(schemas(
        HealthResponse,
        DataSummary,
        DataBundle,
        BuildList,
        ErrorBody,
        Skill,
        Effect,
        SetItem,
        CpStar,
        Build,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_api_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for expected in [
            "/api/health",
            "/api/data/summary",
            "/api/data",
            "/api/builds",
            "/api/builds/{id}",
            "/api/builds/permafrost-marshal",
        ] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
