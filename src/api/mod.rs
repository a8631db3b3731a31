//! HTTP API module for the read-only reference data and build endpoints.

pub mod docs;
pub mod error;
pub mod handlers;
pub mod routes;

pub use docs::ApiDoc;
pub use error::{ApiError, ErrorBody};
pub use handlers::{AppState, SERVICE_NAME};
pub use routes::create_router;
