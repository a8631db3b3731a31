//! Mapping from handler failures to JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::metrics::inc_errors;

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Fixed, human-readable message. Never carries the underlying cause.
    pub error: &'static str,
}

/// Failures a handler can report to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// One of the four data files for the summary failed.
    SummaryUnavailable,
    /// One of the three data files for the full bundle failed.
    DataUnavailable,
    /// The builds directory could not be listed.
    BuildsUnavailable,
    /// The build id was empty after sanitization.
    InvalidBuildId,
    /// The requested build could not be read or parsed.
    BuildNotFound,
    /// The fixed Permafrost Marshal alias could not be read or parsed.
    PermafrostUnavailable,
    /// No Prometheus recorder is installed.
    MetricsDisabled,
}

impl ApiError {
    /// HTTP status for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBuildId => StatusCode::BAD_REQUEST,
            ApiError::BuildNotFound | ApiError::MetricsDisabled => StatusCode::NOT_FOUND,
            ApiError::SummaryUnavailable
            | ApiError::DataUnavailable
            | ApiError::BuildsUnavailable
            | ApiError::PermafrostUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `error` field.
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::SummaryUnavailable => "Failed to load data JSONs",
            ApiError::DataUnavailable => "Failed to load data",
            ApiError::BuildsUnavailable => "Failed to list builds",
            ApiError::InvalidBuildId => "Invalid build id",
            ApiError::BuildNotFound => "Build not found",
            ApiError::PermafrostUnavailable => "Failed to load Permafrost Marshal build",
            ApiError::MetricsDisabled => "Metrics are disabled",
        }
    }

    /// Count this failure against `route` and return it.
    pub fn on(self, route: &'static str) -> Self {
        inc_errors(route, self.status().as_u16());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorBody {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_route_policy() {
        assert_eq!(ApiError::InvalidBuildId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::BuildNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::PermafrostUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::SummaryUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_carries_fixed_message() {
        let response = ApiError::BuildNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::BuildNotFound.message(), "Build not found");
    }
}
