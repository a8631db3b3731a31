//! ESO build engine data server.
//!
//! Serves the repository's static game-reference JSON (skills, effects, item
//! sets, CP stars) and precomputed build documents over a read-only HTTP API.
//! Every request reads its files fresh from disk; nothing is cached.
//!
//! ```text
//! GET /api/health                    -> {status, service}
//! GET /api/data/summary              -> {skillsCount, effectsCount, setsCount, cpStarsCount}
//! GET /api/data                      -> {skills, sets, cpStars}
//! GET /api/builds/:id                -> build document (400 / 404)
//! GET /api/builds/permafrost-marshal -> build document (500)
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`data`]: Data contracts and file access
//! - [`api`]: HTTP API
//! - [`display`]: Client that renders health and the featured build
//! - [`validate`]: Integrity and build checks over the data files
//! - [`aggregate`]: Effect aggregation and Markdown export of a build
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod aggregate;
pub mod api;
pub mod config;
pub mod data;
pub mod display;
pub mod error;
pub mod metrics;
pub mod utils;
pub mod validate;

pub use config::Config;
pub use error::{AppError, Result};
