//! Offline checks over the reference data and build documents.
//!
//! This module handles:
//! - Data-wide integrity (id uniqueness, id namespaces, effect references)
//! - Single-build validation (bar/gear/CP structure and references)

pub mod build;
pub mod integrity;

use serde::Serialize;

pub use build::{check_build, BuildReport};
pub use integrity::{check_data, FieldError, IntegrityReport};

/// Overall outcome of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// No errors found.
    Ok,
    /// At least one error found.
    Error,
}

impl Status {
    /// Status for a list of errors.
    pub fn from_errors<T>(errors: &[T]) -> Self {
        if errors.is_empty() {
            Status::Ok
        } else {
            Status::Error
        }
    }

    /// Whether the check passed.
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}
