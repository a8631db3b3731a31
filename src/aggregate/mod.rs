//! Derived views over a build and the reference data.
//!
//! This module handles:
//! - Collecting the raw effect instances a build applies
//! - Rendering a build as a Markdown grid

pub mod effects;
pub mod markdown;

pub use effects::{aggregate_effects, EffectInstance};
pub use markdown::render_build_md;
